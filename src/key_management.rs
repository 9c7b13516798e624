// Key generation and signing-key selection for the JWKS issuer

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rsa::{RsaPrivateKey, RsaPublicKey};
use uuid::Uuid;

use crate::config::IssuerConfig;
use crate::error::Result;
use crate::key_store::KeyStore;
use crate::types::KeyPair;

impl KeyPair {
    /// Generate a new RSA key pair (public exponent 65537) valid until `valid_until`
    pub fn generate(bits: usize, valid_until: DateTime<Utc>) -> Result<Self> {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, bits)?;
        let public_key = RsaPublicKey::from(&private_key);

        Ok(KeyPair {
            kid: Uuid::new_v4().to_string(),
            private_key,
            public_key,
            valid_from: Utc::now(),
            valid_until,
        })
    }
}

/// Creates keys into the shared store and picks the key a token is signed with.
#[derive(Clone)]
pub struct KeyManager {
    store: Arc<KeyStore>,
    config: Arc<IssuerConfig>,
}

impl KeyManager {
    pub fn new(store: Arc<KeyStore>, config: Arc<IssuerConfig>) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<KeyStore> {
        &self.store
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// Generate a key and insert it into the store.
    ///
    /// With `expired` set the key ends in the past at the moment it is created.
    pub fn create_key_pair(&self, expired: bool) -> Result<Arc<KeyPair>> {
        let now = Utc::now();
        let valid_until = if expired {
            now - self.config.expired_key_backdate
        } else {
            now + self.config.key_validity
        };

        let key = self.store.insert(KeyPair::generate(self.config.key_bits, valid_until)?)?;
        tracing::info!(
            kid = %key.kid,
            expired,
            valid_until = %key.valid_until,
            "generated signing key"
        );
        Ok(key)
    }

    /// Key to sign the next token with.
    ///
    /// A normal request always gets a freshly generated key. An expired
    /// request reuses any key already past expiry and only generates one
    /// when the store has none.
    pub fn signing_key(&self, expired: bool) -> Result<Arc<KeyPair>> {
        if expired {
            if let Some(key) = self.store.find_expired(Utc::now()) {
                tracing::debug!(kid = %key.kid, "reusing expired key");
                return Ok(key);
            }
        }
        self.create_key_pair(expired)
    }
}
