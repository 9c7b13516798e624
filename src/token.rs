// RS256 token issuance

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, Header, encode};

use crate::config::IssuerConfig;
use crate::encoding::encode_private;
use crate::error::Result;
use crate::types::{Claims, KeyPair};

/// A compact-serialized JWT together with what went into it
#[derive(Debug)]
pub struct SignedToken {
    pub kid: String,
    pub claims: Claims,
    pub compact: String,
}

/// Signs claim sets with a stored key pair
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    lifetime: Duration,
    expired_backdate: Duration,
}

impl TokenIssuer {
    pub fn new(lifetime: Duration, expired_backdate: Duration) -> Self {
        Self {
            lifetime,
            expired_backdate,
        }
    }

    pub fn from_config(config: &IssuerConfig) -> Self {
        Self::new(config.token_lifetime, config.expired_token_backdate)
    }

    pub fn issue(&self, subject: &str, key: &KeyPair, expired: bool) -> Result<SignedToken> {
        self.issue_at(subject, key, expired, Utc::now())
    }

    /// Sign `{sub, iat, exp}` with `key`, whatever its own expiry.
    ///
    /// `exp` lies `lifetime` after `now`, or `expired_backdate` before it when
    /// `expired` is set.
    pub fn issue_at(
        &self,
        subject: &str,
        key: &KeyPair,
        expired: bool,
        now: DateTime<Utc>,
    ) -> Result<SignedToken> {
        let exp = if expired {
            now - self.expired_backdate
        } else {
            now + self.lifetime
        };
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(key.kid.clone());

        let encoding_key = encode_private(key)?;
        let compact = encode(&header, &claims, &encoding_key)?;

        tracing::debug!(kid = %key.kid, expired, exp = claims.exp, "issued token");
        Ok(SignedToken {
            kid: key.kid.clone(),
            claims,
            compact,
        })
    }
}
