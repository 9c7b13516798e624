// JWKS issuer
//
// A RESTful JWKS (JSON Web Key Set) server that hands out short-lived RSA
// public keys and issues JWTs signed with the matching private keys. Tokens
// can be requested already expired to test expiry handling downstream.

mod args;

use anyhow::Context;
use args::Args;
use clap::Parser;
use jwks_issuer::{IssuerConfig, server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = IssuerConfig::new()
        .with_key_bits(args.key_bits)
        .context("invalid --key-bits")?;
    server::start_server(args.bind, config).await
}
