//! OpenSSL handshake integration
//!
//! Runs verified-chain CRL checking from the acceptor's verify callback, once
//! OpenSSL has built and accepted the peer chain.

mod errors;

pub use errors::TlsError;

use std::sync::Arc;

use openssl::ssl::{SslAcceptorBuilder, SslVerifyMode};
use openssl::x509::{X509StoreContextRef, X509VerifyResult};
use tracing::{debug, warn};
use x509_parser::prelude::*;

use crate::crl::{CrlFetcher, CrlVerifier};

/// Require client certificates and reject chains that fail CRL checking
pub fn install_crl_check<F>(builder: &mut SslAcceptorBuilder, verifier: Arc<CrlVerifier<F>>)
where
    F: CrlFetcher + 'static,
{
    builder.set_verify_callback(
        SslVerifyMode::PEER | SslVerifyMode::FAIL_IF_NO_PEER_CERT,
        move |preverify_ok, ctx| {
            // the chain is only complete once OpenSSL reaches the leaf
            if !preverify_ok || ctx.error_depth() != 0 {
                return preverify_ok;
            }

            match check_store_chain(verifier.as_ref(), ctx) {
                Ok(()) => {
                    debug!("Peer certificate chain passed CRL checks");
                    true
                }
                Err(e) => {
                    warn!("Rejecting peer certificate chain: {}", e);
                    ctx.set_error(X509VerifyResult::APPLICATION_VERIFICATION);
                    false
                }
            }
        },
    );
}

fn check_store_chain<F: CrlFetcher>(
    verifier: &CrlVerifier<F>,
    ctx: &X509StoreContextRef,
) -> Result<(), TlsError> {
    let chain = ctx.chain().ok_or(TlsError::MissingChain)?;
    let ders = chain
        .iter()
        .map(|cert| cert.to_der())
        .collect::<Result<Vec<_>, _>>()?;

    let certs = parse_der_chain(&ders)?;
    verifier.verify_verified_chains(&[certs])?;
    Ok(())
}

/// Parse DER certificates as handed over by a TLS stack, preserving order
pub fn parse_der_chain(ders: &[Vec<u8>]) -> Result<Vec<X509Certificate<'_>>, TlsError> {
    ders.iter()
        .map(|der| {
            X509Certificate::from_der(der)
                .map(|(_, cert)| cert)
                .map_err(|e| TlsError::Certificate(e.to_string()))
        })
        .collect()
}
