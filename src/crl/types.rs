use ::time::OffsetDateTime;
use x509_parser::num_bigint::BigUint;
use x509_parser::prelude::*;

use super::errors::{CrlError, CrlResult};

/// A revoked certificate entry of a CRL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedEntry {
    pub serial: BigUint,
    pub revocation_date: OffsetDateTime,
}

/// Outcome of matching a serial number against a CRL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revocation {
    Revoked,
    NotRevoked,
}

/// Represents a decoded Certificate Revocation List
#[derive(Debug, Clone)]
pub struct RevocationList {
    /// The raw CRL data in DER format
    der_data: Vec<u8>,
    /// The issuer of this CRL
    pub issuer: String,
    pub this_update: OffsetDateTime,
    pub next_update: OffsetDateTime,
    /// Revoked entries in the order they appear in the list
    pub revoked: Vec<RevokedEntry>,
}

impl RevocationList {
    /// Create a new CRL from DER data
    pub fn from_der(der_data: Vec<u8>) -> CrlResult<Self> {
        let (_, crl) = CertificateRevocationList::from_der(&der_data)
            .map_err(|e| CrlError::Parse(e.to_string()))?;

        let Some(next_update) = crl.next_update() else {
            return Err(CrlError::Parse("CRL has no nextUpdate field".to_string()));
        };

        let revoked = crl
            .iter_revoked_certificates()
            .map(|entry| RevokedEntry {
                serial: entry.serial().clone(),
                revocation_date: entry.revocation_date.to_datetime(),
            })
            .collect();

        let issuer = crl.issuer().to_string();
        let this_update = crl.last_update().to_datetime();
        let next_update = next_update.to_datetime();

        Ok(Self {
            der_data,
            issuer,
            this_update,
            next_update,
            revoked,
        })
    }

    /// Re-parse the borrowed CRL structure, needed for signature checks
    pub(crate) fn parse(&self) -> CrlResult<CertificateRevocationList<'_>> {
        let (_, crl) = CertificateRevocationList::from_der(&self.der_data)
            .map_err(|e| CrlError::Parse(e.to_string()))?;
        Ok(crl)
    }

    /// Look a serial number up in the revoked entries
    pub fn lookup(&self, serial: &BigUint) -> Revocation {
        if self.revoked.iter().any(|entry| &entry.serial == serial) {
            Revocation::Revoked
        } else {
            Revocation::NotRevoked
        }
    }
}
