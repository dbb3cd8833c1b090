//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Auth error: {0}")]
    Auth(#[from] tickrelay_auth::AuthError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] tickrelay_catalog::CatalogError),

    #[error("Store error: {0}")]
    Store(#[from] tickrelay_store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
