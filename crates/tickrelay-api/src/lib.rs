//! HTTP query facade for the TickRelay asset store.
//!
//! Serves the in-memory price state over REST:
//! - Symbol and price snapshot queries
//! - Candle history pass-through to the upstream platform
//! - Runtime control of the catalog synchronizer
//! - Health and Prometheus metrics endpoints

pub mod config;
pub mod server;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use server::{create_router, run_server};
pub use state::ApiState;
pub use types::{ErrorBody, PriceSnapshot, SyncStatus};
