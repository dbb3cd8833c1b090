//! Instrument catalog handling.
//!
//! [`CatalogClient`] pages through the platform's instruments endpoint and
//! fetches historical candles. [`CatalogSynchronizer`] runs the periodic
//! reconcile loop that keeps the asset store's identity fields current,
//! pausable at runtime through [`SyncControl`].

pub mod client;
pub mod error;
pub mod sync;
pub mod types;

pub use client::{CatalogClient, CatalogConfig};
pub use error::{CatalogError, CatalogResult};
pub use sync::{reconcile, CatalogSynchronizer, SyncConfig, SyncControl, SyncOutcome};
pub use types::{
    Candle, CandleHistory, HistoryRequest, InstrumentRecord, InstrumentsPage, PagingInfo,
    ProviderMapping,
};
