use std::io;
use std::path::Path;

use tracing::debug;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

use super::errors::{CrlError, CrlResult, IssuerFile};
use super::parser::parse_pem_crl;
use super::policy::Policy;
use super::types::RevocationList;
use super::validation::validate_crl;

/// Read a configured file; an empty path yields no content
fn read_configured(path: &Path) -> io::Result<Vec<u8>> {
    if path.as_os_str().is_empty() {
        return Ok(Vec::new());
    }
    std::fs::read(path)
}

/// Certificate loaded from a configured PEM file to check CRL signatures
#[derive(Debug, Clone)]
pub struct IssuerCertificate {
    der_data: Vec<u8>,
}

impl IssuerCertificate {
    /// Load the issuer certificate at `path`
    ///
    /// Returns `None` when the path is empty or the file has no content.
    pub fn load(which: IssuerFile, path: &Path) -> CrlResult<Option<Self>> {
        let data = read_configured(path).map_err(|source| CrlError::IssuerLoad {
            which,
            path: path.to_path_buf(),
            source,
        })?;
        if data.is_empty() {
            return Ok(None);
        }

        let (_, pem) = parse_x509_pem(&data).map_err(|_| CrlError::IssuerPem {
            which,
            path: path.to_path_buf(),
        })?;
        let issuer = Self {
            der_data: pem.contents,
        };
        issuer.parse().map_err(|e| CrlError::IssuerParse {
            which,
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("Loaded {} {}", which, path.display());
        Ok(Some(issuer))
    }

    /// Parse the certificate from DER data
    pub fn parse(&self) -> CrlResult<X509Certificate<'_>> {
        let (_, cert) = X509Certificate::from_der(&self.der_data)
            .map_err(|e| CrlError::Parse(e.to_string()))?;
        Ok(cert)
    }
}

/// Load and validate the offline CRL named by the policy
///
/// Returns `None` when no offline CRL is configured. The offline issuer file
/// is loaded whenever configured, but the signature is only checked when the
/// policy asks for it.
pub fn load_offline_crl(policy: &Policy) -> CrlResult<Option<RevocationList>> {
    let data =
        read_configured(&policy.offline_crl_file).map_err(|source| CrlError::OfflineCrlLoad {
            path: policy.offline_crl_file.clone(),
            source,
        })?;
    if data.is_empty() {
        return Ok(None);
    }

    let issuer = IssuerCertificate::load(
        IssuerFile::OfflineCrl,
        &policy.offline_crl_issuer_cert_file,
    )?;
    let issuer_cert = issuer.as_ref().map(IssuerCertificate::parse).transpose()?;

    let crl = parse_pem_crl(&data)?;
    let crl = validate_crl(
        crl,
        issuer_cert.as_ref(),
        policy.verify_offline_signature,
    )?;

    debug!(
        "Loaded offline CRL from {} with {} revoked entries",
        policy.offline_crl_file.display(),
        crl.revoked.len()
    );
    Ok(Some(crl))
}
