// Issuer settings: key size, lifetimes and token subject

use chrono::Duration;

use crate::error::{Error, Result};

const DEFAULT_KEY_BITS: usize = 2048;
const MIN_KEY_BITS: usize = 2048;
const DEFAULT_SUBJECT: &str = "example_user";

/// Lifetimes and key parameters used by the key manager and token issuer
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// How long a freshly generated key stays valid (default: 1 hour)
    pub(crate) key_validity: Duration,
    /// How far in the past an intentionally expired key ends (default: 5 minutes)
    pub(crate) expired_key_backdate: Duration,
    /// Lifetime of a normal token (default: 5 minutes)
    pub(crate) token_lifetime: Duration,
    /// How far in the past an intentionally expired token ends (default: 5 minutes)
    pub(crate) expired_token_backdate: Duration,
    /// RSA modulus size in bits
    pub(crate) key_bits: usize,
    /// `sub` claim placed in every issued token
    pub(crate) subject: String,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            key_validity: Duration::hours(1),
            expired_key_backdate: Duration::minutes(5),
            token_lifetime: Duration::minutes(5),
            expired_token_backdate: Duration::minutes(5),
            key_bits: DEFAULT_KEY_BITS,
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

impl IssuerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the RSA modulus size
    ///
    /// # Errors
    /// Returns `Error::KeyTooSmall` below 2048 bits
    pub fn with_key_bits(mut self, bits: usize) -> Result<Self> {
        if bits < MIN_KEY_BITS {
            return Err(Error::KeyTooSmall(bits));
        }
        self.key_bits = bits;
        Ok(self)
    }

    pub fn with_key_validity(mut self, validity: Duration) -> Self {
        self.key_validity = validity;
        self
    }

    pub fn with_expired_key_backdate(mut self, backdate: Duration) -> Self {
        self.expired_key_backdate = backdate;
        self
    }

    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn with_expired_token_backdate(mut self, backdate: Duration) -> Self {
        self.expired_token_backdate = backdate;
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn key_bits(&self) -> usize {
        self.key_bits
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn token_lifetime(&self) -> Duration {
        self.token_lifetime
    }
}
