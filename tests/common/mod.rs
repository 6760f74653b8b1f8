#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rcgen::{
    BasicConstraints, CertificateParams, CertificateRevocationListParams, CertifiedIssuer,
    CrlDistributionPoint, DistinguishedName, DnType, IsCa, KeyIdMethod, KeyPair, KeyUsagePurpose,
    RevocationReason, RevokedCertParams, SerialNumber, date_time_ymd,
};
use time::OffsetDateTime;

pub type TestIssuer = CertifiedIssuer<'static, KeyPair>;

/// End-entity certificate together with its private key
pub struct TestLeaf {
    pub der: Vec<u8>,
    pub key: KeyPair,
}

fn name(common_name: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::OrganizationName, "mtls-crl integration");
    dn.push(DnType::CommonName, common_name);
    dn
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

pub fn ca(common_name: &str) -> TestIssuer {
    let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
    params.distinguished_name = name(common_name);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::CrlSign,
    ];
    CertifiedIssuer::self_signed(params, key()).unwrap()
}

pub fn leaf(
    common_name: &str,
    serial: u64,
    crl_dp: Option<&str>,
    parent: &TestIssuer,
) -> TestLeaf {
    let mut params = CertificateParams::new(vec![common_name.to_string()]).unwrap();
    params.distinguished_name = name(common_name);
    params.is_ca = IsCa::ExplicitNoCa;
    params.serial_number = Some(serial_number(serial));
    if let Some(uri) = crl_dp {
        params.crl_distribution_points = vec![CrlDistributionPoint {
            uris: vec![uri.to_string()],
        }];
    }
    let key = key();
    let der = params.signed_by(&key, parent).unwrap().der().to_vec();
    TestLeaf { der, key }
}

pub fn crl(issuer: &TestIssuer, revoked: &[u64], next_update: OffsetDateTime) -> Vec<u8> {
    CertificateRevocationListParams {
        this_update: date_time_ymd(2000, 1, 1),
        next_update,
        crl_number: serial_number(7),
        issuing_distribution_point: None,
        revoked_certs: revoked
            .iter()
            .map(|serial| RevokedCertParams {
                serial_number: serial_number(*serial),
                revocation_time: date_time_ymd(2000, 6, 1),
                reason_code: Some(RevocationReason::Superseded),
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

pub fn fresh() -> OffsetDateTime {
    date_time_ymd(2099, 1, 1)
}

pub fn pem(label: &str, der: &[u8]) -> Vec<u8> {
    let encoded = STANDARD.encode(der);
    let mut out = format!("-----BEGIN {label}-----\n");
    for line in encoded.as_bytes().chunks(64) {
        out.push_str(std::str::from_utf8(line).unwrap());
        out.push('\n');
    }
    out.push_str(&format!("-----END {label}-----\n"));
    out.into_bytes()
}

pub fn write_temp(data: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file
}

/// Serve `body` with `status` to every request on a loopback port
///
/// Returns the base URL, e.g. `http://127.0.0.1:4711`.
pub fn spawn_http_server(status: u16, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };

            // drain the request head
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).is_ok_and(|n| n > 0) {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }

            let head = format!(
                "HTTP/1.1 {status} Test\r\nContent-Type: application/pkix-crl\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        }
    });

    format!("http://{addr}")
}
