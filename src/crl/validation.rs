use ::time::OffsetDateTime;
use tracing::{debug, warn};
use x509_parser::prelude::*;

use super::errors::{CrlError, CrlResult};
use super::types::RevocationList;

impl RevocationList {
    /// Check if this CRL is still fresh (nextUpdate strictly after `now`)
    pub fn is_current_at(&self, now: OffsetDateTime) -> bool {
        self.next_update > now
    }

    /// Verify the CRL signature against the issuing certificate
    ///
    /// The issuer must be allowed to sign CRLs: a CA (v3 certificates must
    /// carry basic constraints) and with the cRLSign bit when it carries a
    /// key usage.
    pub fn verify_signature(&self, issuer_cert: &X509Certificate<'_>) -> CrlResult<()> {
        let crl = self.parse()?;

        match issuer_cert.basic_constraints() {
            Ok(Some(bc)) if !bc.value.ca => {
                return Err(CrlError::Signature(
                    "issuer certificate is not a CA".to_string(),
                ));
            }
            Ok(None) if issuer_cert.version() == X509Version::V3 => {
                return Err(CrlError::Signature(
                    "issuer certificate has no basic constraints".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(CrlError::Signature(e.to_string())),
        }

        match issuer_cert.key_usage() {
            Ok(Some(ku)) if !ku.value.crl_sign() => {
                warn!("Issuer certificate not authorized for CRL signing (cRLSign bit not set)");
                return Err(CrlError::Signature(
                    "issuer certificate lacks cRLSign key usage".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(CrlError::Signature(e.to_string())),
        }

        match x509_parser::verify::verify_signature(
            issuer_cert.public_key(),
            &crl.signature_algorithm,
            &crl.signature_value,
            crl.tbs_cert_list.as_ref(),
        ) {
            Ok(()) => {
                debug!("[OK] CRL signature verification passed");
                Ok(())
            }
            Err(e) => {
                debug!("[ERROR] CRL signature verification failed: {:?}", e);
                Err(CrlError::Signature(e.to_string()))
            }
        }
    }
}

/// Validate a decoded CRL, returning it unchanged when it can be trusted
///
/// An expired list is rejected first. With `check_signature` set the list must
/// then verify against `issuer`, and a missing issuer is a signature failure.
pub fn validate_crl(
    crl: RevocationList,
    issuer: Option<&X509Certificate<'_>>,
    check_signature: bool,
) -> CrlResult<RevocationList> {
    validate_crl_at(crl, issuer, check_signature, OffsetDateTime::now_utc())
}

pub(crate) fn validate_crl_at(
    crl: RevocationList,
    issuer: Option<&X509Certificate<'_>>,
    check_signature: bool,
    now: OffsetDateTime,
) -> CrlResult<RevocationList> {
    if !crl.is_current_at(now) {
        warn!("CRL is expired (next_update: {})", crl.next_update);
        return Err(CrlError::Expired {
            next_update: crl.next_update,
        });
    }

    if check_signature {
        let Some(issuer) = issuer else {
            return Err(CrlError::Signature(
                "no issuer certificate available".to_string(),
            ));
        };
        crl.verify_signature(issuer)?;
    }

    Ok(crl)
}
