//! Cached password-grant token provider.

use crate::error::{AuthError, AuthResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default timeout for token requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on the early-expiry buffer, in seconds.
const MAX_EXPIRY_BUFFER_SECS: u64 = 60;

/// Connection settings for the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Full URL of the token endpoint.
    pub token_url: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime in seconds. Missing means the token is already stale.
    #[serde(default)]
    expires_in: u64,
}

/// A cached token with its local expiry instant.
///
/// Tokens are replaced wholesale; a `CachedToken` is never mutated.
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Bearer-token source for all upstream REST and WebSocket calls.
///
/// The cache sits behind a `tokio::sync::Mutex` that is held across the
/// refresh request, so concurrent callers queue on the lock and reuse
/// the token the first caller fetched instead of issuing duplicates.
pub struct TokenProvider {
    client: Client,
    config: AuthConfig,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(config: AuthConfig) -> AuthResult<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            cached: Mutex::new(None),
        })
    }

    /// Return a valid bearer token, refreshing it if the cached one has
    /// passed its effective lifetime.
    pub async fn token(&self) -> AuthResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh() {
                return Ok(token.value.clone());
            }
            debug!("Cached access token expired, refreshing");
        }

        let (value, ttl) = self.request_token().await?;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + ttl,
        });

        Ok(value)
    }

    async fn request_token(&self) -> AuthResult<(String, Duration)> {
        let params = [
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Status { status, body });
        }

        let body = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&body)?;
        if token.access_token.is_empty() {
            return Err(AuthError::EmptyToken);
        }

        let ttl = effective_ttl(token.expires_in);
        info!(
            expires_in = token.expires_in,
            effective_secs = ttl.as_secs(),
            "Obtained access token"
        );

        Ok((token.access_token, ttl))
    }
}

/// Cache lifetime for a token: `expires_in` shortened by a buffer of
/// one tenth of the lifetime, capped at 60 seconds. A token we hand out
/// must survive the request it is used for.
fn effective_ttl(expires_in: u64) -> Duration {
    let buffer = (expires_in / 10).min(MAX_EXPIRY_BUFFER_SECS);
    Duration::from_secs(expires_in.saturating_sub(buffer))
}
