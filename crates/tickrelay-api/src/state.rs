//! Shared state for the query API handlers.

use std::sync::Arc;

use tickrelay_catalog::{CatalogClient, SyncControl};
use tickrelay_store::AssetStore;

/// State handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    /// Live asset store fed by the price stream.
    pub store: Arc<dyn AssetStore>,
    /// Upstream client, used for the history pass-through.
    pub catalog: Arc<CatalogClient>,
    /// On/off switch of the catalog synchronizer.
    pub sync_control: SyncControl,
}

impl ApiState {
    pub fn new(
        store: Arc<dyn AssetStore>,
        catalog: Arc<CatalogClient>,
        sync_control: SyncControl,
    ) -> Self {
        Self {
            store,
            catalog,
            sync_control,
        }
    }
}
