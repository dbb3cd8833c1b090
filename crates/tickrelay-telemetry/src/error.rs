//! Telemetry error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Metrics exposition failed: {0}")]
    Metrics(String),
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
