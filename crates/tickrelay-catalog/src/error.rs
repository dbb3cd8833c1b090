//! Catalog error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Auth error: {0}")]
    Auth(#[from] tickrelay_auth::AuthError),

    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog endpoint returned HTTP {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("Catalog response parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
