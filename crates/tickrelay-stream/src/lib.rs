//! WebSocket price streaming for TickRelay.
//!
//! Connects to the platform streaming endpoint with:
//! - One connection per data provider, token carried in the URL
//! - One l1 "last" subscription per instrument
//! - Last-trade updates applied straight to the shared asset store
//! - Batch-level supervision: when every connection has terminated the
//!   manager fetches a fresh token and starts the next batch

pub mod connection;
pub mod error;
pub mod manager;
pub mod message;

pub use connection::{ConnectionPhase, ProviderConnection};
pub use error::{StreamError, StreamResult};
pub use manager::{partition_by_provider, PriceStreamManager, StreamConfig};
pub use message::{LastQuote, SubscribeRequest, TickFrame};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
