// JWKS discovery and token issuance handlers

use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};

use crate::config::IssuerConfig;
use crate::encoding::encode_public;
use crate::error::{Error, Result};
use crate::key_management::KeyManager;
use crate::key_store::KeyStore;
use crate::token::TokenIssuer;
use crate::types::{AuthQuery, AuthResponse, JwksResponse};

/// Shared handler state: the key manager (and through it the key store)
/// plus the token issuer
#[derive(Clone)]
pub struct AppState {
    pub keys: KeyManager,
    pub issuer: TokenIssuer,
}

impl AppState {
    pub fn new(config: IssuerConfig) -> Self {
        Self::with_store(Arc::new(KeyStore::new()), config)
    }

    /// Build state around an existing store, e.g. one a test has pre-filled
    pub fn with_store(store: Arc<KeyStore>, config: IssuerConfig) -> Self {
        let issuer = TokenIssuer::from_config(&config);
        Self {
            keys: KeyManager::new(store, Arc::new(config)),
            issuer,
        }
    }

    pub fn store(&self) -> &Arc<KeyStore> {
        self.keys.store()
    }
}

/// Purge expired keys, then render what is left as a JWKS document
pub fn discovery_document(store: &KeyStore, now: DateTime<Utc>) -> JwksResponse {
    let keys = store
        .purge_and_list_valid(now)
        .iter()
        .map(|key| encode_public(key))
        .collect();
    JwksResponse { keys }
}

/// JWKS endpoint handler - serves public keys in JWKS format
/// Expired keys are purged from the store before rendering
pub async fn jwks_handler(State(state): State<AppState>) -> Json<JwksResponse> {
    Json(discovery_document(state.store(), Utc::now()))
}

/// Auth endpoint handler - issues JWTs signed with a stored key
/// The presence of an `expired` query parameter yields an already-expired token
pub async fn auth_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let expired = AuthQuery::from_raw(query.as_deref()).expired;

    // Key generation and RSA signing are CPU-bound
    let token = tokio::task::spawn_blocking(move || {
        let key = state.keys.signing_key(expired)?;
        state
            .issuer
            .issue(state.keys.config().subject(), &key, expired)
    })
    .await??;

    tracing::info!(kid = %token.kid, expired, "issued token");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: token.compact,
        }),
    ))
}

/// Fallback for any method a route does not serve
pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}
