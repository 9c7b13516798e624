// Shared fixtures for unit tests

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::types::KeyPair;

static FIXTURE_KEY: OnceLock<RsaPrivateKey> = OnceLock::new();

/// One 2048-bit key generated per test binary; tests that only care about
/// ids and validity windows reuse it.
fn fixture_private_key() -> &'static RsaPrivateKey {
    FIXTURE_KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut OsRng, 2048).expect("fixture key generation failed")
    })
}

pub(crate) fn sample_key(kid: &str, valid_until: DateTime<Utc>) -> KeyPair {
    let private_key = fixture_private_key().clone();
    let public_key = RsaPublicKey::from(&private_key);
    KeyPair {
        kid: kid.to_string(),
        private_key,
        public_key,
        valid_from: Utc::now(),
        valid_until,
    }
}
