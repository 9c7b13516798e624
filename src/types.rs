// Data structures for the JWKS issuer

use chrono::{DateTime, Utc};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

/// RSA key pair with its validity window
#[derive(Clone)]
pub struct KeyPair {
    pub kid: String,                 // Key ID
    pub private_key: RsaPrivateKey,  // RSA private key
    pub public_key: RsaPublicKey,    // RSA public key
    pub valid_from: DateTime<Utc>,   // Creation timestamp
    pub valid_until: DateTime<Utc>,  // Expiry timestamp
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("kid", &self.kid)
            .field("valid_from", &self.valid_from)
            .field("valid_until", &self.valid_until)
            .finish_non_exhaustive()
    }
}

/// JSON Web Key structure for JWKS response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kty: String, // Key type (RSA)
    #[serde(rename = "use")]
    pub key_use: String, // Key usage (sig for signature)
    pub kid: String, // Key ID
    pub n: String,   // Modulus (base64url)
    pub e: String,   // Exponent (base64url)
    pub alg: String, // Algorithm (RS256)
}

/// JWKS response format
#[derive(Debug, Serialize, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<JsonWebKey>,
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expires at
}

/// Auth endpoint response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query parameters for auth endpoint
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AuthQuery {
    pub expired: bool, // `expired` present, with any value or none
}

impl AuthQuery {
    /// Parse a raw query string. Never fails: unknown, repeated or
    /// malformed pairs are simply ignored.
    pub fn from_raw(query: Option<&str>) -> Self {
        let expired = query.is_some_and(|q| {
            form_urlencoded::parse(q.as_bytes()).any(|(name, _)| name == "expired")
        });
        AuthQuery { expired }
    }
}
