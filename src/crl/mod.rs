//! Certificate Revocation List (CRL) checking for mutual-TLS peers
//!
//! # Features
//! - CRL fetching from certificate or configured distribution points
//! - Offline CRL file as a last resort source
//! - Signature and freshness validation of every CRL before use
//! - Fail-closed verification of verified chains and raw peer certificates

mod errors;
mod fetcher;
mod issuer;
mod parser;
mod policy;
mod source;
mod types;
mod validation;
mod verifier;

// Re-export public types
pub use errors::{CrlError, CrlResult, ErrorKind, IssuerFile};
pub use fetcher::{CrlFetcher, HttpFetcher};
pub use issuer::{IssuerStrategy, SubjectMatchIssuer, VerifiedChainIssuer, find_issuer};
pub use parser::{distribution_point, parse_pem_certificates, parse_pem_crl};
pub use policy::Policy;
pub use source::{IssuerCertificate, load_offline_crl};
pub use types::{Revocation, RevocationList, RevokedEntry};
pub use validation::validate_crl;
pub use verifier::CrlVerifier;

#[cfg(test)]
mod test_utils;
