//! Prometheus metrics for the TickRelay service.
//!
//! Covers:
//! - Catalog sync cycles and their outcomes
//! - Size of the tracked asset catalog
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_int_counter, register_int_gauge, CounterVec, Encoder,
    IntCounter, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Number of assets currently tracked in the store.
pub static ASSETS_TRACKED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "tickrelay_assets_tracked",
        "Number of assets currently tracked in the store"
    )
    .unwrap()
});

/// Total assets added by catalog sync.
pub static ASSETS_ADDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tickrelay_assets_added_total",
        "Total assets added by catalog sync"
    )
    .unwrap()
});

/// Total assets whose identity fields were updated by catalog sync.
pub static ASSETS_UPDATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "tickrelay_assets_updated_total",
        "Total assets updated by catalog sync"
    )
    .unwrap()
});

/// Catalog sync cycles by outcome.
/// Labels: outcome (ok/error)
pub static SYNC_RUNS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tickrelay_sync_runs_total",
        "Total catalog sync cycles",
        &["outcome"]
    )
    .unwrap()
});

/// Facade for recording metrics from the rest of the service.
pub struct Metrics;

impl Metrics {
    /// Record one catalog sync cycle.
    pub fn sync_run(outcome: &str) {
        SYNC_RUNS_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record the result of a completed reconcile pass.
    pub fn catalog_reconciled(added: usize, updated: usize, total: usize) {
        ASSETS_ADDED_TOTAL.inc_by(added as u64);
        ASSETS_UPDATED_TOTAL.inc_by(updated as u64);
        ASSETS_TRACKED.set(total as i64);
    }

    /// Set the tracked-asset gauge without touching the counters.
    pub fn assets_tracked(total: usize) {
        ASSETS_TRACKED.set(total as i64);
    }

    /// Render every registered metric in Prometheus text exposition format.
    pub fn render() -> TelemetryResult<String> {
        let metric_families = prometheus::gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_metrics_show_up_in_exposition() {
        Metrics::catalog_reconciled(2, 1, 3);
        Metrics::sync_run("ok");

        let body = Metrics::render().unwrap();
        assert!(body.contains("tickrelay_assets_tracked"));
        assert!(body.contains("tickrelay_assets_added_total"));
        assert!(body.contains("tickrelay_sync_runs_total"));
    }

    #[test]
    fn test_assets_tracked_follows_the_latest_value() {
        Metrics::assets_tracked(10);
        Metrics::assets_tracked(4);
        assert_eq!(ASSETS_TRACKED.get(), 4);
    }
}
