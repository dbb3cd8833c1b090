//! Main application orchestration.
//!
//! Coordinates the long-running components:
//! - catalog synchronizer (periodic instrument reconciliation)
//! - price stream manager (WebSocket batches feeding the store)
//! - query API server

use crate::config::AppConfig;
use crate::error::AppResult;
use std::sync::Arc;
use std::time::Duration;
use tickrelay_api::{run_server, ApiState};
use tickrelay_auth::TokenProvider;
use tickrelay_catalog::{CatalogClient, CatalogSynchronizer, SyncControl};
use tickrelay_store::{load_snapshot, save_snapshot, AssetStore, MemoryAssetStore};
use tickrelay_stream::PriceStreamManager;
use tickrelay_telemetry::Metrics;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How long shutdown waits for worker tasks before abandoning them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Main application.
pub struct Application {
    config: AppConfig,
    store: Arc<dyn AssetStore>,
    tokens: Arc<TokenProvider>,
    catalog: Arc<CatalogClient>,
    sync_control: SyncControl,
    shutdown: CancellationToken,
}

impl Application {
    /// Build all components. Restores the store snapshot when one is
    /// configured and present.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let store: Arc<dyn AssetStore> = Arc::new(MemoryAssetStore::new());

        if let Some(path) = config.snapshot_path() {
            let restored = load_snapshot(store.as_ref(), path)?;
            if restored > 0 {
                info!(restored, path = %path.display(), "Restored asset snapshot");
            }
        }
        Metrics::assets_tracked(store.len());

        let tokens = Arc::new(TokenProvider::new(config.auth_config())?);
        let catalog = Arc::new(CatalogClient::new(config.catalog_config(), tokens.clone())?);
        let sync_control = SyncControl::new(config.catalog_sync.start_enabled);

        Ok(Self {
            config,
            store,
            tokens,
            catalog,
            sync_control,
            shutdown: CancellationToken::new(),
        })
    }

    /// Number of assets currently tracked.
    pub fn asset_count(&self) -> usize {
        self.store.len()
    }

    /// Run all components until ctrl-c, then shut down and write the
    /// snapshot.
    pub async fn run(self) -> AppResult<()> {
        info!(
            assets = self.store.len(),
            sync_enabled = self.sync_control.is_running(),
            "Starting TickRelay"
        );

        let synchronizer = CatalogSynchronizer::new(
            self.catalog.clone(),
            self.store.clone(),
            self.sync_control.clone(),
            self.config.sync_config(),
            self.shutdown.clone(),
        );
        let sync_handle = tokio::spawn(async move { synchronizer.run().await });

        let manager = PriceStreamManager::new(
            self.config.stream_config(),
            self.tokens.clone(),
            self.store.clone(),
            self.shutdown.clone(),
        );
        let stream_handle = tokio::spawn(async move { manager.run().await });

        let api_handle = if self.config.api.enabled {
            let state = ApiState::new(
                self.store.clone(),
                self.catalog.clone(),
                self.sync_control.clone(),
            );
            let api_config = self.config.api_config();
            let shutdown = self.shutdown.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = run_server(state, api_config, shutdown).await {
                    error!(error = %e, "Query API server failed");
                }
            }))
        } else {
            info!("Query API disabled");
            None
        };

        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");
        self.shutdown.cancel();

        let mut handles = vec![sync_handle, stream_handle];
        handles.extend(api_handle);
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            for handle in handles {
                let _ = handle.await;
            }
        })
        .await;
        if drained.is_err() {
            warn!("Some workers did not stop in time, abandoning them");
        }

        if let Some(path) = self.config.snapshot_path() {
            match save_snapshot(self.store.as_ref(), path) {
                Ok(written) => {
                    info!(written, path = %path.display(), "Saved asset snapshot");
                }
                Err(e) => warn!(error = %e, "Failed to save asset snapshot"),
            }
        }

        info!("Shutdown complete");
        Ok(())
    }
}
