// Conversions from stored key pairs into JWK publication form and signing keys

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::EncodingKey;
use rsa::BigUint;
use rsa::pkcs8::EncodePrivateKey;
use rsa::traits::PublicKeyParts;

use crate::error::Result;
use crate::types::{JsonWebKey, KeyPair};

/// Unpadded base64url of the minimal big-endian bytes of `value`.
/// Zero encodes as a single zero byte.
pub fn base64url_uint(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

/// Public half of `key` as a JWK entry
pub fn encode_public(key: &KeyPair) -> JsonWebKey {
    JsonWebKey {
        kty: "RSA".to_string(),
        key_use: "sig".to_string(),
        kid: key.kid.clone(),
        n: base64url_uint(key.public_key.n()),
        e: base64url_uint(key.public_key.e()),
        alg: "RS256".to_string(),
    }
}

/// Signing handle for `key`, going through PKCS#8 PEM as jsonwebtoken expects
pub fn encode_private(key: &KeyPair) -> Result<EncodingKey> {
    let private_key_pem = key.private_key.to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)?;
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())?;
    Ok(encoding_key)
}
