//! Synchronizer loop tests: pause flag, resume, and shutdown.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tickrelay_auth::{AuthConfig, TokenProvider};
use tickrelay_catalog::{CatalogClient, CatalogConfig, CatalogSynchronizer, SyncConfig, SyncControl};
use tickrelay_store::{AssetStore, MemoryAssetStore};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

async fn start_platform() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));

    async fn token() -> Json<Value> {
        Json(json!({ "access_token": "tok", "expires_in": 900 }))
    }

    async fn instruments(State(hits): State<Arc<AtomicUsize>>) -> Json<Value> {
        hits.fetch_add(1, Ordering::SeqCst);
        Json(json!({
            "paging": { "page": 1, "pages": 1, "items": 1 },
            "data": [{
                "id": "asset-a", "symbol": "EUR/USD", "kind": "forex",
                "mappings": { "oanda": { "symbol": "EUR_USD", "exchange": "OANDA" } }
            }]
        }))
    }

    let app = Router::new()
        .route("/token", post(token))
        .route("/api/instruments", get(instruments))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), hits)
}

fn synchronizer(
    base: &str,
    store: Arc<MemoryAssetStore>,
    control: SyncControl,
    shutdown: CancellationToken,
) -> CatalogSynchronizer {
    let tokens = Arc::new(
        TokenProvider::new(AuthConfig {
            token_url: format!("{}/token", base),
            client_id: "app-cli".to_string(),
            username: "user@example.com".to_string(),
            password: "secret".to_string(),
        })
        .unwrap(),
    );
    let client = Arc::new(
        CatalogClient::new(
            CatalogConfig {
                base_url: base.to_string(),
                instruments_endpoint: "/api/instruments".to_string(),
                history_endpoint: "/api/history".to_string(),
                page_size: 100,
                provider_priority: Vec::new(),
            },
            tokens,
        )
        .unwrap(),
    );

    CatalogSynchronizer::new(
        client,
        store,
        control,
        SyncConfig {
            sync_interval: Duration::from_millis(50),
            idle_interval: Duration::from_millis(20),
        },
        shutdown,
    )
}

#[tokio::test]
async fn paused_synchronizer_does_not_fetch() {
    let (base, hits) = start_platform().await;
    let store = Arc::new(MemoryAssetStore::new());
    let control = SyncControl::new(false);
    let shutdown = CancellationToken::new();

    let sync = Arc::new(synchronizer(&base, store.clone(), control.clone(), shutdown.clone()));
    let handle = tokio::spawn({
        let sync = sync.clone();
        async move { sync.run().await }
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(store.is_empty());

    // resume and wait for the first sync to land
    control.start();
    let filled = timeout(Duration::from_secs(2), async {
        loop {
            if store.len() == 1 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(filled.is_ok(), "sync should fill the store after resume");
    assert_eq!(store.find("asset-a").unwrap().symbol, "EUR/USD");

    // pause again: after the in-flight cycle drains, fetches stop
    control.stop();
    tokio::time::sleep(Duration::from_millis(150)).await;
    let settled = hits.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(hits.load(Ordering::SeqCst), settled);

    shutdown.cancel();
    timeout(Duration::from_secs(1), handle)
        .await
        .expect("synchronizer should stop on shutdown")
        .unwrap();
}

#[tokio::test]
async fn shutdown_interrupts_a_sleeping_synchronizer() {
    let (base, _hits) = start_platform().await;
    let store = Arc::new(MemoryAssetStore::new());
    let shutdown = CancellationToken::new();

    let sync = Arc::new(synchronizer(
        &base,
        store,
        SyncControl::new(true),
        shutdown.clone(),
    ));
    let handle = tokio::spawn({
        let sync = sync.clone();
        async move { sync.run().await }
    });

    // let it complete at least one cycle, then cancel mid-sleep
    tokio::time::sleep(Duration::from_millis(70)).await;
    shutdown.cancel();

    timeout(Duration::from_secs(1), handle)
        .await
        .expect("synchronizer should stop promptly")
        .unwrap();
}
