//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tickrelay_api::ApiConfig;
use tickrelay_auth::AuthConfig;
use tickrelay_catalog::{CatalogConfig, SyncConfig};
use tickrelay_stream::StreamConfig;

/// Environment variable that overrides `upstream.password`, keeping the
/// secret out of the config file.
pub const PASSWORD_ENV: &str = "TICKRELAY_UPSTREAM_PASSWORD";

/// Upstream platform connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Platform base URL, e.g. `https://platform.example.com`.
    pub base_url: String,
    /// WebSocket streaming endpoint URL.
    pub ws_url: String,
    /// Token endpoint path, relative to `base_url`.
    pub token_endpoint: String,
    /// Instruments listing path, relative to `base_url`.
    pub instruments_endpoint: String,
    /// Candle history path, relative to `base_url`.
    pub history_endpoint: String,
    pub client_id: String,
    pub username: String,
    /// May be left empty in the file and supplied via the
    /// `TICKRELAY_UPSTREAM_PASSWORD` environment variable.
    #[serde(default)]
    pub password: String,
    /// Page size for the instruments listing. Default: 10000.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Preferred providers, most preferred first. Instruments mapped to
    /// none of these fall back to their first mapping.
    #[serde(default)]
    pub provider_priority: Vec<String>,
}

fn default_page_size() -> u32 {
    10_000
}

/// Catalog synchronizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSyncConfig {
    /// Delay between sync cycles (seconds). Default: 60.
    #[serde(default = "default_sync_interval_secs")]
    pub interval_secs: u64,
    /// Re-check delay while sync is paused (seconds). Default: 60.
    #[serde(default = "default_idle_poll_secs")]
    pub idle_poll_secs: u64,
    /// Whether sync runs at startup. Default: true. Can be flipped at
    /// runtime through the API.
    #[serde(default = "default_start_enabled")]
    pub start_enabled: bool,
}

fn default_sync_interval_secs() -> u64 {
    60
}

fn default_idle_poll_secs() -> u64 {
    60
}

fn default_start_enabled() -> bool {
    true
}

impl Default for CatalogSyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sync_interval_secs(),
            idle_poll_secs: default_idle_poll_secs(),
            start_enabled: default_start_enabled(),
        }
    }
}

/// Price stream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    /// Wait before the first stream batch, giving the catalog sync a
    /// chance to fill the store (seconds). Default: 30.
    #[serde(default = "default_startup_delay_secs")]
    pub startup_delay_secs: u64,
    /// Wait between batches while the store is empty (seconds).
    /// Default: 60.
    #[serde(default = "default_empty_store_cooldown_secs")]
    pub empty_store_cooldown_secs: u64,
    /// Wait after a failed batch before retrying (seconds). Default: 60.
    #[serde(default = "default_retry_cooldown_secs")]
    pub retry_cooldown_secs: u64,
}

fn default_startup_delay_secs() -> u64 {
    30
}

fn default_empty_store_cooldown_secs() -> u64 {
    60
}

fn default_retry_cooldown_secs() -> u64 {
    60
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            startup_delay_secs: default_startup_delay_secs(),
            empty_store_cooldown_secs: default_empty_store_cooldown_secs(),
            retry_cooldown_secs: default_retry_cooldown_secs(),
        }
    }
}

/// Query API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whether the query API is served. Default: true.
    #[serde(default = "default_api_enabled")]
    pub enabled: bool,
    /// Bind address. Default: `0.0.0.0`.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Listen port. Default: 8080.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_api_enabled() -> bool {
    true
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: default_api_enabled(),
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Snapshot persistence settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON Lines snapshot file, loaded at startup and written at
    /// graceful shutdown. No persistence when unset.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream platform connection settings.
    pub upstream: UpstreamConfig,
    /// Catalog synchronizer settings.
    #[serde(default)]
    pub catalog_sync: CatalogSyncConfig,
    /// Price stream settings.
    #[serde(default)]
    pub stream: StreamingConfig,
    /// Query API settings.
    #[serde(default)]
    pub api: HttpConfig,
    /// Snapshot persistence settings.
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load from a TOML file and apply environment overrides.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read {path}: {e}")))?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse {path}: {e}")))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Pull secrets from the environment over file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            if !password.is_empty() {
                self.upstream.password = password;
            }
        }
    }

    /// Reject configurations with missing upstream settings. Run after
    /// `apply_env_overrides` so an env-supplied password counts.
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("upstream.base_url", &self.upstream.base_url),
            ("upstream.ws_url", &self.upstream.ws_url),
            ("upstream.token_endpoint", &self.upstream.token_endpoint),
            (
                "upstream.instruments_endpoint",
                &self.upstream.instruments_endpoint,
            ),
            ("upstream.history_endpoint", &self.upstream.history_endpoint),
            ("upstream.client_id", &self.upstream.client_id),
            ("upstream.username", &self.upstream.username),
            ("upstream.password", &self.upstream.password),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )))
        }
    }

    /// Snapshot file path, when persistence is configured.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.store.snapshot_path.as_deref().map(Path::new)
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            token_url: format!("{}{}", self.upstream.base_url, self.upstream.token_endpoint),
            client_id: self.upstream.client_id.clone(),
            username: self.upstream.username.clone(),
            password: self.upstream.password.clone(),
        }
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            base_url: self.upstream.base_url.clone(),
            instruments_endpoint: self.upstream.instruments_endpoint.clone(),
            history_endpoint: self.upstream.history_endpoint.clone(),
            page_size: self.upstream.page_size,
            provider_priority: self.upstream.provider_priority.clone(),
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            sync_interval: Duration::from_secs(self.catalog_sync.interval_secs),
            idle_interval: Duration::from_secs(self.catalog_sync.idle_poll_secs),
        }
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            ws_url: self.upstream.ws_url.clone(),
            startup_delay: Duration::from_secs(self.stream.startup_delay_secs),
            empty_store_cooldown: Duration::from_secs(self.stream.empty_store_cooldown_secs),
            retry_cooldown: Duration::from_secs(self.stream.retry_cooldown_secs),
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            bind: self.api.bind.clone(),
            port: self.api.port,
        }
    }
}
