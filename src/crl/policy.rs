use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use url::Url;

/// Revocation checking policy, built once and shared read-only by every check
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// How many peer certificates, counted from the leaf, raw mode must check.
    /// Zero checks all of them.
    pub depth: usize,
    /// PEM file holding the offline CRL; empty means not configured
    pub offline_crl_file: PathBuf,
    pub offline_crl_issuer_cert_file: PathBuf,
    /// Fallback distribution point for certificates that carry none
    #[serde(deserialize_with = "empty_url_as_none")]
    pub distribution_point: Option<Url>,
    pub distribution_point_issuer_cert_file: PathBuf,
    /// Also verify the offline CRL signature against its issuer file
    pub verify_offline_signature: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            depth: 1,
            offline_crl_file: PathBuf::new(),
            offline_crl_issuer_cert_file: PathBuf::new(),
            distribution_point: None,
            distribution_point_issuer_cert_file: PathBuf::new(),
            verify_offline_signature: false,
        }
    }
}

fn empty_url_as_none<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) => Url::parse(url).map(Some).map_err(serde::de::Error::custom),
    }
}
