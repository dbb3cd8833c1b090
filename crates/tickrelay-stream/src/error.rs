//! Streaming error types.

use thiserror::Error;

/// Errors from the streaming layer.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Token acquisition for the streaming session failed.
    #[error("Auth error: {0}")]
    Auth(#[from] tickrelay_auth::AuthError),

    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    Tungstenite(#[from] tokio_tungstenite::tungstenite::Error),

    /// Frame encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A spawned stream worker did not run to completion.
    #[error("Stream worker failed: {0}")]
    Worker(String),
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
