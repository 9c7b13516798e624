// Command-line arguments for the jwks-issuer binary

use std::net::SocketAddr;

use clap::Parser;

/// JWKS issuer - publishes short-lived RSA keys and mints RS256 tokens
#[derive(Parser, Debug)]
#[command(name = "jwks-issuer", version, about, long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// RSA modulus size for generated keys (minimum 2048)
    #[arg(long, default_value = "2048")]
    pub key_bits: usize,

    /// Log filter used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(args)
    }

    #[test]
    fn test_defaults() {
        let args = parse_args(&["jwks-issuer"]).unwrap();
        assert_eq!(args.bind, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(args.key_bits, 2048);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let args = parse_args(&[
            "jwks-issuer",
            "--bind",
            "127.0.0.1:9000",
            "--key-bits",
            "4096",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.bind.port(), 9000);
        assert_eq!(args.key_bits, 4096);
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn test_rejects_bad_address() {
        assert!(parse_args(&["jwks-issuer", "--bind", "not-an-address"]).is_err());
    }
}
