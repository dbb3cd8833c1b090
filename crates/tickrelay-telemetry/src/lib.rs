//! Prometheus metrics and structured logging for TickRelay.
//!
//! Provides:
//! - Prometheus counters and gauges for catalog sync and the asset store
//! - Structured JSON logging with tracing
//! - Text exposition for the /metrics endpoint

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
