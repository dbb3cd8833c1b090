//! Asset store trait and in-memory implementation.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tickrelay_core::{Asset, PriceQuote};

/// Store contract consumed by the ingestion paths and the query façade.
///
/// Writes are split by field group: `upsert` owns the identity fields,
/// `apply_quote` owns the price fields. An implementation must never let
/// one path overwrite the other's fields.
pub trait AssetStore: Send + Sync {
    /// Look up an asset by instrument id.
    fn find(&self, instrument_id: &str) -> Option<Asset>;

    /// Insert a new asset, or replace the identity fields of an existing
    /// one. Price fields of an existing record are preserved.
    fn upsert(&self, asset: Asset);

    /// Record a last-trade observation on an existing asset.
    ///
    /// Returns `false` when the instrument id is unknown; the caller
    /// decides whether that is worth logging.
    fn apply_quote(&self, instrument_id: &str, quote: &PriceQuote) -> bool;

    /// All assets, in unspecified order.
    fn list(&self) -> Vec<Asset>;

    /// Number of assets currently tracked.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `DashMap`-backed store keyed by instrument id.
///
/// Each entry is updated under its own shard lock, so a quote application
/// and an identity upsert for the same instrument serialize against each
/// other without a global lock.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: DashMap<String, Asset>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self {
            assets: DashMap::new(),
        }
    }
}

impl AssetStore for MemoryAssetStore {
    fn find(&self, instrument_id: &str) -> Option<Asset> {
        self.assets.get(instrument_id).map(|entry| entry.clone())
    }

    fn upsert(&self, asset: Asset) {
        match self.assets.entry(asset.instrument_id.clone()) {
            Entry::Occupied(mut occupied) => {
                let existing = occupied.get_mut();
                existing.symbol = asset.symbol;
                existing.kind = asset.kind;
                existing.provider = asset.provider;
            }
            Entry::Vacant(vacant) => {
                vacant.insert(asset);
            }
        }
    }

    fn apply_quote(&self, instrument_id: &str, quote: &PriceQuote) -> bool {
        match self.assets.get_mut(instrument_id) {
            Some(mut entry) => {
                entry.apply_quote(quote);
                true
            }
            None => false,
        }
    }

    fn list(&self) -> Vec<Asset> {
        self.assets.iter().map(|entry| entry.clone()).collect()
    }

    fn len(&self) -> usize {
        self.assets.len()
    }
}
