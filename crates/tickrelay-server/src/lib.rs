//! TickRelay service.
//!
//! Wires the long-running pieces together:
//! - catalog synchronizer keeping the asset store aligned with upstream
//! - price stream manager feeding live quotes into the store
//! - HTTP query API over the store

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
