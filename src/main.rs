use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{WrapErr, eyre};
use mtls_crl::{
    config::Config,
    crl::{CrlVerifier, parse_pem_certificates},
    telemetry,
    tls::parse_der_chain,
};

/// Check a peer certificate bundle against the configured CRLs
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// PEM bundle with the peer certificates, leaf first
    bundle: PathBuf,

    /// Treat the bundle as a chain already validated leaf to root
    #[arg(long)]
    verified: bool,

    /// Override the configured raw-mode check depth
    #[arg(long)]
    depth: Option<usize>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load()?;
    if let Some(depth) = cli.depth {
        config.crl.depth = depth;
    }
    tracing::info!("Loaded configuration: {:?}", config);

    let bundle = std::fs::read(&cli.bundle)
        .wrap_err_with(|| format!("failed to read {}", cli.bundle.display()))?;
    let ders = parse_pem_certificates(&bundle)?;
    if ders.is_empty() {
        return Err(eyre!("no certificates found in {}", cli.bundle.display()));
    }
    let certs = parse_der_chain(&ders)?;

    let verifier = CrlVerifier::new(config.crl)?;
    if cli.verified {
        tracing::debug!("Checking {} certificates as a verified chain", certs.len());
        verifier.verify_verified_chains(&[certs])?;
    } else {
        tracing::debug!("Checking raw certificates to depth {}", verifier.policy().depth);
        verifier.verify_raw_certificates(&certs)?;
    }

    tracing::info!("{} passed CRL checks", cli.bundle.display());
    Ok(())
}
