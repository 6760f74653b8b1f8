use reqwest::blocking::Client;
use tracing::info;

use super::errors::{CrlError, CrlResult};

/// Source of raw CRL bytes for a distribution point URL
#[cfg_attr(test, mockall::automock)]
pub trait CrlFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> CrlResult<Vec<u8>>;
}

/// Fetches CRLs over plain HTTP(S) GET, blocking the calling thread
///
/// A single attempt is made per call; timeouts are the transport defaults.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Returns an error if the HTTP client cannot be initialized
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl CrlFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> CrlResult<Vec<u8>> {
        info!("Fetching CRL from: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| CrlError::Retrieval {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CrlError::HttpStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let body = response.bytes().map_err(|source| CrlError::ReadBody {
            url: url.to_string(),
            source,
        })?;

        Ok(body.to_vec())
    }
}
