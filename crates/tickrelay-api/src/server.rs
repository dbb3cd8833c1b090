//! HTTP server implementation using axum.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use tickrelay_catalog::HistoryRequest;
use tickrelay_telemetry::Metrics;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::state::ApiState;
use crate::types::{ErrorBody, PriceSnapshot, SyncStatus};

/// Create the axum router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/assets", get(list_symbols))
        .route("/api/assets/prices", get(get_prices))
        .route("/api/assets/prices/all", get(get_all_prices))
        .route("/api/assets/history", get(get_history))
        .route("/api/sync/start", post(start_sync))
        .route("/api/sync/stop", post(stop_sync))
        .route("/api/sync/status", get(sync_status))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// List the symbols of every tracked asset, sorted.
async fn list_symbols(State(state): State<ApiState>) -> Json<Vec<String>> {
    let mut symbols: Vec<String> = state
        .store
        .list()
        .into_iter()
        .map(|asset| asset.symbol)
        .collect();
    symbols.sort();
    Json(symbols)
}

#[derive(Debug, Deserialize)]
struct PricesParams {
    /// Comma-separated symbol list, e.g. `EUR/USD,XAU/USD`.
    #[serde(default)]
    symbols: String,
}

/// Price snapshots for the requested symbols. Unknown symbols are
/// silently omitted; symbol matching ignores case.
async fn get_prices(
    State(state): State<ApiState>,
    Query(params): Query<PricesParams>,
) -> Json<Vec<PriceSnapshot>> {
    let wanted: Vec<&str> = params
        .symbols
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut snapshots: Vec<PriceSnapshot> = state
        .store
        .list()
        .into_iter()
        .filter(|asset| wanted.iter().any(|w| asset.symbol.eq_ignore_ascii_case(w)))
        .map(PriceSnapshot::from)
        .collect();
    snapshots.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    Json(snapshots)
}

/// Price snapshots for every tracked asset, most recently updated first.
/// Assets that have never ticked sort last, ordered by symbol.
async fn get_all_prices(State(state): State<ApiState>) -> Json<Vec<PriceSnapshot>> {
    let mut snapshots: Vec<PriceSnapshot> =
        state.store.list().into_iter().map(PriceSnapshot::from).collect();
    snapshots.sort_by(|a, b| match (&a.last_updated, &b.last_updated) {
        (Some(a_ts), Some(b_ts)) => b_ts.cmp(a_ts),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.symbol.cmp(&b.symbol),
    });
    Json(snapshots)
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    symbol: Option<String>,
    interval: Option<u32>,
    periodicity: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

/// Fetch historical candles for one symbol from the upstream catalog.
async fn get_history(
    State(state): State<ApiState>,
    Query(params): Query<HistoryParams>,
) -> Response {
    let (symbol, interval, periodicity, start) = match (
        params.symbol.as_deref().filter(|s| !s.is_empty()),
        params.interval,
        params.periodicity.as_deref().filter(|p| !p.is_empty()),
        params.start,
    ) {
        (Some(symbol), Some(interval), Some(periodicity), Some(start)) => {
            (symbol, interval, periodicity, start)
        }
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "symbol, interval, periodicity and start are required",
            );
        }
    };

    let asset = state
        .store
        .list()
        .into_iter()
        .find(|asset| asset.symbol.eq_ignore_ascii_case(symbol));
    let asset = match asset {
        Some(asset) => asset,
        None => {
            return error_response(
                StatusCode::NOT_FOUND,
                &format!("Unknown symbol: {symbol}"),
            );
        }
    };

    let request = HistoryRequest {
        instrument_id: asset.instrument_id,
        provider: asset.provider,
        interval,
        periodicity: periodicity.to_string(),
        start_date: start,
        end_date: params.end,
    };

    match state.catalog.fetch_history(&request).await {
        Ok(candles) => Json(candles).into_response(),
        Err(e) => {
            warn!(symbol, error = %e, "History request failed");
            error_response(StatusCode::BAD_GATEWAY, "Upstream history request failed")
        }
    }
}

/// Resume periodic catalog synchronization.
async fn start_sync(State(state): State<ApiState>) -> Json<SyncStatus> {
    state.sync_control.start();
    info!("Catalog sync started via API");
    Json(SyncStatus { running: true })
}

/// Pause periodic catalog synchronization.
async fn stop_sync(State(state): State<ApiState>) -> Json<SyncStatus> {
    state.sync_control.stop();
    info!("Catalog sync stopped via API");
    Json(SyncStatus { running: false })
}

async fn sync_status(State(state): State<ApiState>) -> Json<SyncStatus> {
    Json(SyncStatus {
        running: state.sync_control.is_running(),
    })
}

async fn health() -> &'static str {
    "OK"
}

/// Prometheus exposition endpoint.
async fn metrics() -> Response {
    match Metrics::render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to render metrics");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Metrics unavailable")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Run the query API server until the shutdown token fires.
pub async fn run_server(
    state: ApiState,
    config: ApiConfig,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr, "Starting query API server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
