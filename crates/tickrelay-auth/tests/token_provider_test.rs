//! Token provider integration tests against a mock token endpoint.
//!
//! Covers the caching contract:
//! - a fresh token is served from cache without another upstream call
//! - a zero-lifetime token is treated as stale and refetched
//! - concurrent first callers share a single refresh request

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Json, Router};
use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tickrelay_auth::{AuthConfig, AuthError, TokenProvider};
use tokio::sync::Mutex;

/// Form body the endpoint expects from a password grant.
#[derive(Debug, Clone, Deserialize)]
struct GrantForm {
    grant_type: String,
    client_id: String,
    username: String,
    password: String,
}

/// Scripted token endpoint recording every grant request it receives.
#[derive(Clone)]
struct MockTokenEndpoint {
    status: StatusCode,
    reply: Value,
    delay: Duration,
    hits: Arc<AtomicUsize>,
    grants: Arc<Mutex<Vec<GrantForm>>>,
}

async fn issue_token(
    State(mock): State<MockTokenEndpoint>,
    Form(grant): Form<GrantForm>,
) -> (StatusCode, Json<Value>) {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    mock.grants.lock().await.push(grant);
    if !mock.delay.is_zero() {
        tokio::time::sleep(mock.delay).await;
    }
    (mock.status, Json(mock.reply.clone()))
}

async fn start_endpoint(status: StatusCode, reply: Value, delay: Duration) -> (String, MockTokenEndpoint) {
    let mock = MockTokenEndpoint {
        status,
        reply,
        delay,
        hits: Arc::new(AtomicUsize::new(0)),
        grants: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route("/token", post(issue_token))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/token", addr), mock)
}

fn config(token_url: String) -> AuthConfig {
    AuthConfig {
        token_url,
        client_id: "app-cli".to_string(),
        username: "r_test@example.com".to_string(),
        password: "kisfiz-vUnvo9-matvah".to_string(),
    }
}

#[tokio::test]
async fn cached_token_is_reused_within_lifetime() {
    let (url, mock) = start_endpoint(
        StatusCode::OK,
        json!({ "access_token": "tok-1", "expires_in": 900 }),
        Duration::ZERO,
    )
    .await;

    let provider = TokenProvider::new(config(url)).unwrap();

    assert_eq!(provider.token().await.unwrap(), "tok-1");
    assert_eq!(provider.token().await.unwrap(), "tok-1");
    assert_eq!(mock.hits.load(Ordering::SeqCst), 1);

    let grants = mock.grants.lock().await;
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].grant_type, "password");
    assert_eq!(grants[0].client_id, "app-cli");
    assert_eq!(grants[0].username, "r_test@example.com");
    assert_eq!(grants[0].password, "kisfiz-vUnvo9-matvah");
}

#[tokio::test]
async fn zero_lifetime_token_is_refetched_every_call() {
    let (url, mock) = start_endpoint(
        StatusCode::OK,
        json!({ "access_token": "tok", "expires_in": 0 }),
        Duration::ZERO,
    )
    .await;

    let provider = TokenProvider::new(config(url)).unwrap();

    provider.token().await.unwrap();
    provider.token().await.unwrap();
    assert_eq!(mock.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_first_calls_share_one_refresh() {
    let (url, mock) = start_endpoint(
        StatusCode::OK,
        json!({ "access_token": "tok-shared", "expires_in": 900 }),
        Duration::from_millis(150),
    )
    .await;

    let provider = Arc::new(TokenProvider::new(config(url)).unwrap());

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let provider = provider.clone();
            tokio::spawn(async move { provider.token().await.unwrap() })
        })
        .collect();

    for token in join_all(handles).await {
        assert_eq!(token.unwrap(), "tok-shared");
    }
    assert_eq!(mock.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (url, _mock) = start_endpoint(
        StatusCode::UNAUTHORIZED,
        json!({ "error": "invalid_grant" }),
        Duration::ZERO,
    )
    .await;

    let provider = TokenProvider::new(config(url)).unwrap();

    match provider.token().await {
        Err(AuthError::Status { status, body }) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("expected Status error, got {:?}", other.map(|_| "token")),
    }
}

#[tokio::test]
async fn empty_access_token_is_rejected() {
    let (url, _mock) = start_endpoint(
        StatusCode::OK,
        json!({ "access_token": "", "expires_in": 900 }),
        Duration::ZERO,
    )
    .await;

    let provider = TokenProvider::new(config(url)).unwrap();
    assert!(matches!(provider.token().await, Err(AuthError::EmptyToken)));
}

#[tokio::test]
async fn missing_access_token_is_a_parse_error() {
    let (url, _mock) = start_endpoint(
        StatusCode::OK,
        json!({ "expires_in": 900 }),
        Duration::ZERO,
    )
    .await;

    let provider = TokenProvider::new(config(url)).unwrap();
    assert!(matches!(provider.token().await, Err(AuthError::Parse(_))));
}
