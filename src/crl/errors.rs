use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use time::OffsetDateTime;

/// Which configured issuer certificate file an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuerFile {
    /// Issuer of the offline CRL file
    OfflineCrl,
    /// Issuer of CRLs fetched from the fallback distribution point
    DistributionPoint,
}

impl fmt::Display for IssuerFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OfflineCrl => f.write_str("offline CRL issuer cert file"),
            Self::DistributionPoint => f.write_str("CRL distribution points issuer cert file"),
        }
    }
}

/// Broad failure category of a [`CrlError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Retrieval,
    Io,
    Parse,
    Signature,
    Expired,
    NoSource,
    Revoked,
}

/// CRL verification errors
#[derive(Error, Debug)]
pub enum CrlError {
    #[error("failed to retrieve CRL from {url}")]
    Retrieval {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to retrieve CRL from {url}: HTTP status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read CRL from {url}")]
    ReadBody {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to load offline CRL file {}", path.display())]
    OfflineCrlLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load {which} {}", path.display())]
    IssuerLoad {
        which: IssuerFile,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode PEM block in {which} {}", path.display())]
    IssuerPem { which: IssuerFile, path: PathBuf },

    #[error("failed to parse certificate in {which} {}: {reason}", path.display())]
    IssuerParse {
        which: IssuerFile,
        path: PathBuf,
        reason: String,
    },

    #[error("failed to parse CRL: {0}")]
    Parse(String),

    #[error("failed to verify CRL signature: {0}")]
    Signature(String),

    #[error("CRL expired at {next_update}")]
    Expired { next_update: OffsetDateTime },

    #[error("neither offline CRL file nor CRL distribution points available for certificate")]
    NoSource,

    #[error("certificate {serial} revoked")]
    Revoked { serial: String },
}

impl CrlError {
    /// Category of the failure, for callers that only care about the broad kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Retrieval { .. } | Self::HttpStatus { .. } | Self::ReadBody { .. } => {
                ErrorKind::Retrieval
            }
            Self::OfflineCrlLoad { .. } | Self::IssuerLoad { .. } => ErrorKind::Io,
            Self::IssuerPem { .. } | Self::IssuerParse { .. } | Self::Parse(_) => ErrorKind::Parse,
            Self::Signature(_) => ErrorKind::Signature,
            Self::Expired { .. } => ErrorKind::Expired,
            Self::NoSource => ErrorKind::NoSource,
            Self::Revoked { .. } => ErrorKind::Revoked,
        }
    }
}

/// Convenient Result type alias
pub type CrlResult<T> = Result<T, CrlError>;
