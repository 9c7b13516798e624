// Library module for the JWKS issuer
//
// Generates short-lived RSA signing keys, publishes the valid ones as a JSON
// Web Key Set and mints RS256 tokens, optionally already expired, for
// exercising expiry handling in relying parties.

pub mod config;
pub mod encoding;
pub mod endpoints;
pub mod error;
pub mod key_management;
pub mod key_store;
pub mod server;
pub mod token;
pub mod types;

#[cfg(test)]
mod testutil;

pub use config::IssuerConfig;
pub use error::{Error, Result};
pub use key_management::KeyManager;
pub use key_store::KeyStore;
pub use token::{SignedToken, TokenIssuer};
pub use types::KeyPair;
