// Error type shared by the key store, the token issuer and the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::types::ErrorResponse;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Key id already present in the key store: {0}")]
    DuplicateKeyId(String),
    #[error("Key generation failed: {0}")]
    KeyGeneration(#[from] rsa::Error),
    #[error("RSA modulus of {0} bits is below the 2048-bit minimum")]
    KeyTooSmall(usize),
    #[error("JWT encoding error: {0}")]
    Signing(String),
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        Error::Signing(error.to_string())
    }
}

impl From<rsa::pkcs8::Error> for Error {
    fn from(error: rsa::pkcs8::Error) -> Self {
        Error::Signing(error.to_string())
    }
}

impl Error {
    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
