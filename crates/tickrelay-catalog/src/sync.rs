//! Periodic catalog-to-store synchronization.

use crate::client::CatalogClient;
use crate::error::CatalogResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tickrelay_core::Asset;
use tickrelay_store::AssetStore;
use tickrelay_telemetry::Metrics;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shared on/off switch for the synchronizer.
///
/// Handed to the synchronizer at construction and flipped at runtime by
/// the control API; the loop reads it at the top of every cycle.
#[derive(Debug, Clone)]
pub struct SyncControl {
    running: Arc<AtomicBool>,
}

impl SyncControl {
    pub fn new(running: bool) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(running)),
        }
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::Relaxed);
        info!("Catalog sync enabled");
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        info!("Catalog sync disabled");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

impl Default for SyncControl {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Timing for the synchronizer loop.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Delay between sync cycles.
    pub sync_interval: Duration,
    /// Re-check delay while paused.
    pub idle_interval: Duration,
}

/// Counts from one reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub added: usize,
    pub updated: usize,
    /// Catalog records considered, including unchanged ones.
    pub total: usize,
}

/// Merge a fetched catalog into the store.
///
/// Unknown instruments are inserted; known ones are rewritten only when
/// an identity field drifted. Unchanged records are not written at all,
/// so a repeat pass over the same catalog performs zero writes. Price
/// fields are never part of this path.
pub fn reconcile(store: &dyn AssetStore, fetched: Vec<Asset>) -> SyncOutcome {
    let total = fetched.len();
    let mut added = 0;
    let mut updated = 0;

    for asset in fetched {
        match store.find(&asset.instrument_id) {
            None => {
                store.upsert(asset);
                added += 1;
            }
            Some(existing) if existing.identity_differs(&asset) => {
                store.upsert(asset);
                updated += 1;
            }
            Some(_) => {}
        }
    }

    SyncOutcome {
        added,
        updated,
        total,
    }
}

/// Background task keeping the store's identity fields current.
pub struct CatalogSynchronizer {
    client: Arc<CatalogClient>,
    store: Arc<dyn AssetStore>,
    control: SyncControl,
    config: SyncConfig,
    shutdown: CancellationToken,
}

impl CatalogSynchronizer {
    pub fn new(
        client: Arc<CatalogClient>,
        store: Arc<dyn AssetStore>,
        control: SyncControl,
        config: SyncConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            store,
            control,
            config,
            shutdown,
        }
    }

    /// Run until the shutdown token fires.
    ///
    /// A failed cycle is logged and retried after the normal interval;
    /// nothing short of shutdown ends this loop.
    pub async fn run(&self) {
        info!(
            interval_secs = self.config.sync_interval.as_secs(),
            "Catalog synchronizer started"
        );

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            if !self.control.is_running() {
                debug!("Catalog sync is paused");
                if !self.wait(self.config.idle_interval).await {
                    break;
                }
                continue;
            }

            match self.sync_once().await {
                Ok(outcome) => {
                    Metrics::sync_run("ok");
                    Metrics::catalog_reconciled(outcome.added, outcome.updated, self.store.len());
                    info!(
                        added = outcome.added,
                        updated = outcome.updated,
                        total = outcome.total,
                        "Catalog sync complete"
                    );
                }
                Err(e) => {
                    Metrics::sync_run("error");
                    warn!(error = %e, "Catalog sync failed, retrying next cycle");
                }
            }

            if !self.wait(self.config.sync_interval).await {
                break;
            }
        }

        info!("Catalog synchronizer stopped");
    }

    /// Fetch the catalog once and reconcile it into the store.
    pub async fn sync_once(&self) -> CatalogResult<SyncOutcome> {
        let fetched = self.client.fetch_all_instruments().await?;
        Ok(reconcile(self.store.as_ref(), fetched))
    }

    /// Sleep that is cut short by shutdown. Returns `false` on shutdown.
    async fn wait(&self, period: Duration) -> bool {
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(period) => true,
        }
    }
}
