//! Batch supervision of provider streams.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tickrelay_auth::TokenProvider;
use tickrelay_core::Asset;
use tickrelay_store::AssetStore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::connection::ProviderConnection;
use crate::error::{StreamError, StreamResult};

/// Streaming settings.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// WebSocket endpoint, without the token query parameter.
    pub ws_url: String,
    /// Wait before the first batch, giving the catalog a chance to fill.
    pub startup_delay: Duration,
    /// Wait between batches while the store has no instruments.
    pub empty_store_cooldown: Duration,
    /// Wait after a failed batch before trying again.
    pub retry_cooldown: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            ws_url: String::new(),
            startup_delay: Duration::from_secs(30),
            empty_store_cooldown: Duration::from_secs(60),
            retry_cooldown: Duration::from_secs(60),
        }
    }
}

/// How a stream batch came to an end.
#[derive(Debug, PartialEq, Eq)]
enum BatchOutcome {
    /// Every provider connection ran and terminated.
    Streamed,
    /// The store had no instruments, nothing to subscribe to.
    EmptyStore,
}

/// Supervises one WebSocket connection per provider and restarts the whole
/// batch once all of them have terminated.
///
/// Restart granularity is the batch: a fresh token is fetched and the
/// instrument list re-read from the store, so catalog changes are picked
/// up on every cycle.
pub struct PriceStreamManager {
    config: StreamConfig,
    tokens: Arc<TokenProvider>,
    store: Arc<dyn AssetStore>,
    shutdown: CancellationToken,
}

impl PriceStreamManager {
    pub fn new(
        config: StreamConfig,
        tokens: Arc<TokenProvider>,
        store: Arc<dyn AssetStore>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            tokens,
            store,
            shutdown,
        }
    }

    /// Run stream batches until shutdown.
    pub async fn run(&self) {
        if !self.config.startup_delay.is_zero() {
            info!(
                delay_secs = self.config.startup_delay.as_secs(),
                "Delaying first stream batch"
            );
            if !self.wait(self.config.startup_delay).await {
                info!("Price stream manager stopped before the first batch");
                return;
            }
        }
        info!("Price stream manager started");

        while !self.shutdown.is_cancelled() {
            match self.run_batch().await {
                Ok(BatchOutcome::Streamed) => {
                    info!("Stream batch over, starting the next one");
                }
                Ok(BatchOutcome::EmptyStore) => {
                    info!(
                        cooldown_secs = self.config.empty_store_cooldown.as_secs(),
                        "No instruments to stream yet"
                    );
                    if !self.wait(self.config.empty_store_cooldown).await {
                        break;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Stream batch failed");
                    if !self.wait(self.config.retry_cooldown).await {
                        break;
                    }
                }
            }
        }
        info!("Price stream manager stopped");
    }

    /// Run one batch: token, instrument list, one connection per provider,
    /// then wait for every connection to terminate.
    async fn run_batch(&self) -> StreamResult<BatchOutcome> {
        let token = self.tokens.token().await?;
        let assets = self.store.list();
        if assets.is_empty() {
            return Ok(BatchOutcome::EmptyStore);
        }

        let partitions = partition_by_provider(assets);
        info!(providers = partitions.len(), "Starting stream batch");

        let mut workers = Vec::with_capacity(partitions.len());
        for (provider, instrument_ids) in partitions {
            let connection = ProviderConnection::new(
                self.config.ws_url.clone(),
                token.clone(),
                provider,
                instrument_ids,
                Arc::clone(&self.store),
                self.shutdown.clone(),
            );
            workers.push(tokio::spawn(async move { connection.run().await }));
        }

        let mut first_error = None;
        for joined in join_all(workers).await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(e) => {
                    error!(error = %e, "Stream worker panicked");
                    if first_error.is_none() {
                        first_error = Some(StreamError::Worker(e.to_string()));
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(BatchOutcome::Streamed),
        }
    }

    /// Cancellable sleep. Returns false when shutdown fired first.
    async fn wait(&self, duration: Duration) -> bool {
        tokio::select! {
            () = self.shutdown.cancelled() => false,
            () = tokio::time::sleep(duration) => true,
        }
    }
}

/// Group assets into per-provider instrument lists.
///
/// A `BTreeMap` keeps the connect order stable across cycles.
pub fn partition_by_provider(assets: Vec<Asset>) -> BTreeMap<String, Vec<String>> {
    let mut partitions: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for asset in assets {
        partitions
            .entry(asset.provider)
            .or_default()
            .push(asset.instrument_id);
    }
    partitions
}
