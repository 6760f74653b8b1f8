use openssl::error::ErrorStack;
use thiserror::Error;

use crate::crl::CrlError;

/// Errors that can occur while checking a peer during the TLS handshake.
#[derive(Error, Debug)]
pub enum TlsError {
    #[error(transparent)]
    OpenSSL(#[from] ErrorStack),

    #[error(transparent)]
    Crl(#[from] CrlError),

    #[error("peer certificate chain unavailable")]
    MissingChain,

    #[error("failed to parse peer certificate: {0}")]
    Certificate(String),
}
