use tracing::{debug, info, instrument, warn};
use x509_parser::prelude::*;

use super::errors::{CrlError, CrlResult, IssuerFile};
use super::fetcher::{CrlFetcher, HttpFetcher};
use super::issuer::{IssuerStrategy, SubjectMatchIssuer, VerifiedChainIssuer};
use super::parser::{distribution_point, parse_pem_crl};
use super::policy::Policy;
use super::source::{IssuerCertificate, load_offline_crl};
use super::types::{Revocation, RevocationList};
use super::validation::validate_crl;

/// Checks peer certificate chains against their applicable CRLs
///
/// Every call reads the offline CRL and fetches distribution points afresh;
/// nothing is cached between calls. The first failing certificate aborts the
/// whole verification.
#[derive(Debug, Clone)]
pub struct CrlVerifier<F = HttpFetcher> {
    policy: Policy,
    fetcher: F,
}

impl CrlVerifier<HttpFetcher> {
    /// Returns an error if the HTTP client cannot be initialized
    pub fn new(policy: Policy) -> Result<Self, reqwest::Error> {
        Ok(Self::with_fetcher(policy, HttpFetcher::new()?))
    }
}

impl<F: CrlFetcher> CrlVerifier<F> {
    pub fn with_fetcher(policy: Policy, fetcher: F) -> Self {
        Self { policy, fetcher }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Check chains the TLS layer already validated, ordered leaf to root
    ///
    /// Every certificate of every chain is checked.
    #[instrument(skip_all, fields(chains = chains.len()))]
    pub fn verify_verified_chains(&self, chains: &[Vec<X509Certificate<'_>>]) -> CrlResult<()> {
        let offline_crl = load_offline_crl(&self.policy)?;

        for chain in chains {
            self.check_chain(chain, &VerifiedChainIssuer, None, offline_crl.as_ref())?;
        }
        Ok(())
    }

    /// Check raw peer certificates that have not been chain-validated
    ///
    /// Certificates are checked in input order until `depth` of them passed.
    #[instrument(skip_all, fields(certificates = certs.len(), depth = self.policy.depth))]
    pub fn verify_raw_certificates(&self, certs: &[X509Certificate<'_>]) -> CrlResult<()> {
        let offline_crl = load_offline_crl(&self.policy)?;
        let depth = (self.policy.depth > 0).then_some(self.policy.depth);

        self.check_chain(certs, &SubjectMatchIssuer, depth, offline_crl.as_ref())
    }

    fn check_chain(
        &self,
        certs: &[X509Certificate<'_>],
        strategy: &impl IssuerStrategy,
        depth: Option<usize>,
        offline_crl: Option<&RevocationList>,
    ) -> CrlResult<()> {
        for (position, cert) in certs.iter().enumerate() {
            let issuer = strategy.issuer_of(certs, position).unwrap_or_else(|| {
                debug!(
                    "No issuer found for {}, treating it as self-issued",
                    cert.subject()
                );
                cert
            });

            self.check_certificate(cert, issuer, offline_crl)?;

            if depth.is_some_and(|depth| position + 1 == depth) {
                debug!("Reached CRL check depth {}", position + 1);
                return Ok(());
            }
        }
        Ok(())
    }

    fn check_certificate(
        &self,
        cert: &X509Certificate<'_>,
        issuer: &X509Certificate<'_>,
        offline_crl: Option<&RevocationList>,
    ) -> CrlResult<()> {
        let fetched = self.crl_from_distribution_point(cert, issuer)?;
        let crl = match (&fetched, offline_crl) {
            (Some(crl), _) => crl,
            (None, Some(offline_crl)) => {
                debug!("Using offline CRL for {}", cert.subject());
                offline_crl
            }
            (None, None) => {
                warn!("No CRL available for {}", cert.subject());
                return Err(CrlError::NoSource);
            }
        };

        match crl.lookup(&cert.tbs_certificate.serial) {
            Revocation::Revoked => {
                let serial = hex::encode(cert.tbs_certificate.raw_serial());
                warn!("Certificate {} with serial {} is revoked", cert.subject(), serial);
                Err(CrlError::Revoked { serial })
            }
            Revocation::NotRevoked => {
                debug!("Certificate {} not found in CRL", cert.subject());
                Ok(())
            }
        }
    }

    /// CRL from the certificate's own distribution point, else the fallback one
    ///
    /// `None` means neither is available and the offline CRL applies.
    fn crl_from_distribution_point(
        &self,
        cert: &X509Certificate<'_>,
        issuer: &X509Certificate<'_>,
    ) -> CrlResult<Option<RevocationList>> {
        if let Some(url) = distribution_point(cert) {
            return self.retrieve_crl(&url, Some(issuer)).map(Some);
        }

        let Some(url) = &self.policy.distribution_point else {
            return Ok(None);
        };
        let dp_issuer = IssuerCertificate::load(
            IssuerFile::DistributionPoint,
            &self.policy.distribution_point_issuer_cert_file,
        )?;
        let dp_issuer = dp_issuer.as_ref().map(IssuerCertificate::parse).transpose()?;

        self.retrieve_crl(url.as_str(), dp_issuer.as_ref()).map(Some)
    }

    fn retrieve_crl(
        &self,
        url: &str,
        issuer: Option<&X509Certificate<'_>>,
    ) -> CrlResult<RevocationList> {
        let data = self.fetcher.fetch(url)?;
        let crl = parse_pem_crl(&data)?;
        let crl = validate_crl(crl, issuer, true)?;

        info!(
            "Fetched and validated CRL from {} ({} revoked entries)",
            url,
            crl.revoked.len()
        );
        Ok(crl)
    }
}
