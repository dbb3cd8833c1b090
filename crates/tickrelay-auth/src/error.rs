//! Auth error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token endpoint returned HTTP {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("Token response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Token response contained an empty access_token")]
    EmptyToken,
}

pub type AuthResult<T> = Result<T, AuthError>;
