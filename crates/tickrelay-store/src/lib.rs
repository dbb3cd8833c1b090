//! Asset store for the tickrelay service.
//!
//! The store is the hand-off point between the two ingestion paths:
//! catalog synchronization writes identity fields through [`AssetStore::upsert`],
//! the streaming path writes price fields through [`AssetStore::apply_quote`].
//! The in-memory implementation is backed by `DashMap`; JSON Lines snapshots
//! let a restart keep the last known prices.

pub mod error;
pub mod snapshot;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use snapshot::{load_snapshot, save_snapshot};
pub use store::{AssetStore, MemoryAssetStore};
