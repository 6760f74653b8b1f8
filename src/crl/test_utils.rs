use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rcgen::{
    BasicConstraints, CertificateParams, CertificateRevocationListParams, CertifiedIssuer,
    CrlDistributionPoint, DistinguishedName, DnType, IsCa, KeyIdMethod, KeyPair, KeyUsagePurpose,
    RevocationReason, RevokedCertParams, SerialNumber, date_time_ymd,
};
use time::OffsetDateTime;

pub(crate) type TestIssuer = CertifiedIssuer<'static, KeyPair>;

/// Distinguished name with a common name and an optional serialNumber attribute
pub(crate) fn name(common_name: &str, subject_serial: Option<&str>) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::OrganizationName, "mtls-crl tests");
    dn.push(DnType::CommonName, common_name);
    if let Some(serial) = subject_serial {
        dn.push(DnType::CustomDnType(vec![2, 5, 4, 5]), serial);
    }
    dn
}

fn ca_params(common_name: &str, subject_serial: Option<&str>) -> CertificateParams {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name = name(common_name, subject_serial);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::CrlSign,
    ];
    params
}

/// Minimal big-endian encoding, as a CA would assign it
fn serial_number(serial: u64) -> SerialNumber {
    let bytes = serial.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    SerialNumber::from_slice(&bytes[start..])
}

fn key() -> KeyPair {
    KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap()
}

pub(crate) fn root_ca(common_name: &str, subject_serial: Option<&str>) -> TestIssuer {
    CertifiedIssuer::self_signed(ca_params(common_name, subject_serial), key()).unwrap()
}

/// Self-signed v3 certificate allowed to sign CRLs but without basic constraints
pub(crate) fn unconstrained_issuer(common_name: &str) -> TestIssuer {
    let mut params = ca_params(common_name, None);
    params.is_ca = IsCa::NoCa;
    CertifiedIssuer::self_signed(params, key()).unwrap()
}

pub(crate) fn intermediate_ca(
    common_name: &str,
    subject_serial: Option<&str>,
    crl_dp: Option<&str>,
    parent: &TestIssuer,
) -> TestIssuer {
    let mut params = ca_params(common_name, subject_serial);
    if let Some(uri) = crl_dp {
        params.crl_distribution_points = vec![CrlDistributionPoint {
            uris: vec![uri.to_string()],
        }];
    }
    CertifiedIssuer::signed_by(params, key(), parent).unwrap()
}

/// DER end-entity certificate with the given serial number
pub(crate) fn leaf(serial: u64, crl_dp: Option<&str>, parent: &TestIssuer) -> Vec<u8> {
    let mut params = CertificateParams::new(vec!["client.example.com".to_string()]).unwrap();
    params.distinguished_name = name("client.example.com", None);
    params.is_ca = IsCa::ExplicitNoCa;
    params.serial_number = Some(serial_number(serial));
    if let Some(uri) = crl_dp {
        params.crl_distribution_points = vec![CrlDistributionPoint {
            uris: vec![uri.to_string()],
        }];
    }
    params.signed_by(&key(), parent).unwrap().der().to_vec()
}

/// DER CRL signed by `issuer` revoking `revoked`
pub(crate) fn crl(issuer: &TestIssuer, revoked: &[u64], next_update: OffsetDateTime) -> Vec<u8> {
    CertificateRevocationListParams {
        this_update: date_time_ymd(2000, 1, 1),
        next_update,
        crl_number: serial_number(1),
        issuing_distribution_point: None,
        revoked_certs: revoked
            .iter()
            .map(|serial| RevokedCertParams {
                serial_number: serial_number(*serial),
                revocation_time: date_time_ymd(2000, 6, 1),
                reason_code: Some(RevocationReason::KeyCompromise),
                invalidity_date: None,
            })
            .collect(),
        key_identifier_method: KeyIdMethod::Sha256,
    }
    .signed_by(issuer)
    .unwrap()
    .der()
    .to_vec()
}

pub(crate) fn fresh() -> OffsetDateTime {
    date_time_ymd(2099, 1, 1)
}

pub(crate) fn stale() -> OffsetDateTime {
    date_time_ymd(2001, 1, 1)
}

pub(crate) fn pem(label: &str, der: &[u8]) -> String {
    let encoded = STANDARD.encode(der);
    let mut out = format!("-----BEGIN {label}-----\n");
    for line in encoded.as_bytes().chunks(64) {
        out.push_str(std::str::from_utf8(line).unwrap());
        out.push('\n');
    }
    out.push_str(&format!("-----END {label}-----\n"));
    out
}

pub(crate) fn crl_pem(der: &[u8]) -> Vec<u8> {
    pem("X509 CRL", der).into_bytes()
}

pub(crate) fn cert_pem(der: &[u8]) -> Vec<u8> {
    pem("CERTIFICATE", der).into_bytes()
}

pub(crate) fn write_temp(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write as _;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file
}
