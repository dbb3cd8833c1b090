//! HTTP client for the instruments and history endpoints.

use crate::error::{CatalogError, CatalogResult};
use crate::types::{
    Candle, CandleHistory, HistoryRequest, InstrumentRecord, InstrumentsPage, ProviderMapping,
};
use chrono::Utc;
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tickrelay_auth::TokenProvider;
use tickrelay_core::Asset;
use tracing::{debug, info, warn};

/// Default timeout for catalog requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the catalog endpoints.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Platform base URL, e.g. `https://platform.example.com`.
    pub base_url: String,
    /// Instruments listing path, relative to `base_url`.
    pub instruments_endpoint: String,
    /// Candle history path, relative to `base_url`.
    pub history_endpoint: String,
    /// Page size for the instruments listing.
    pub page_size: u32,
    /// Preferred providers, most preferred first. Records that map to
    /// none of these fall back to their first mapping key.
    pub provider_priority: Vec<String>,
}

/// Bearer-authenticated client for the platform's catalog REST API.
pub struct CatalogClient {
    client: Client,
    config: CatalogConfig,
    tokens: Arc<TokenProvider>,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig, tokens: Arc<TokenProvider>) -> CatalogResult<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    /// Fetch the complete instrument catalog as assets.
    ///
    /// Pages from 1 until a page comes back empty or the reported page
    /// count is reached. Any HTTP or parse failure aborts the whole
    /// fetch; a partial catalog is never returned.
    pub async fn fetch_all_instruments(&self) -> CatalogResult<Vec<Asset>> {
        let mut assets = Vec::new();
        let mut page = 1u32;

        loop {
            let listing = self.fetch_instruments_page(page).await?;

            if page == 1 {
                debug!(
                    pages = listing.paging.pages,
                    items = listing.paging.items,
                    "Fetched first catalog page"
                );
            }

            if listing.data.is_empty() {
                break;
            }

            for record in &listing.data {
                match self.to_asset(record) {
                    Some(asset) => assets.push(asset),
                    None => {
                        debug!(
                            instrument_id = %record.id,
                            symbol = %record.symbol,
                            "Skipping instrument without provider mappings"
                        );
                    }
                }
            }

            if page >= listing.paging.pages {
                break;
            }
            page += 1;
        }

        info!(count = assets.len(), pages = page, "Fetched instrument catalog");
        Ok(assets)
    }

    async fn fetch_instruments_page(&self, page: u32) -> CatalogResult<InstrumentsPage> {
        let url = format!("{}{}", self.config.base_url, self.config.instruments_endpoint);
        let token = self.tokens.token().await?;

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("page", page), ("size", self.config.page_size)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status { status, body });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch historical candles for one instrument/provider pair.
    pub async fn fetch_history(&self, request: &HistoryRequest) -> CatalogResult<Vec<Candle>> {
        let url = format!("{}{}", self.config.base_url, self.config.history_endpoint);
        let token = self.tokens.token().await?;

        let end_date = request
            .end_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("instrumentId", request.instrument_id.as_str()),
                ("provider", request.provider.as_str()),
                ("interval", &request.interval.to_string()),
                ("periodicity", request.periodicity.as_str()),
                ("startDate", &request.start_date.format("%Y-%m-%d").to_string()),
                ("endDate", &end_date.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status { status, body });
        }

        let body = response.text().await?;
        let history: CandleHistory = serde_json::from_str(&body)?;

        debug!(
            instrument_id = %request.instrument_id,
            bars = history.data.len(),
            "Fetched price history"
        );
        Ok(history.data)
    }

    /// Build an asset from a listing record, or `None` if the record has
    /// no provider mappings and so cannot be streamed from anywhere.
    fn to_asset(&self, record: &InstrumentRecord) -> Option<Asset> {
        let provider = choose_provider(&self.config.provider_priority, &record.mappings)?;
        Some(Asset::new(
            record.id.clone(),
            record.symbol.clone(),
            record.kind.clone(),
            provider,
        ))
    }
}

/// Pick the provider an instrument will be subscribed under.
///
/// The first entry of `priority` that appears in `mappings` wins. When
/// none does (or no priority is configured), the smallest mapping key is
/// used, so the choice stays stable across fetches.
pub fn choose_provider(
    priority: &[String],
    mappings: &BTreeMap<String, ProviderMapping>,
) -> Option<String> {
    if mappings.is_empty() {
        return None;
    }

    for preferred in priority {
        if mappings.contains_key(preferred) {
            return Some(preferred.clone());
        }
    }

    if !priority.is_empty() {
        warn!(
            available = ?mappings.keys().collect::<Vec<_>>(),
            "No preferred provider mapped, falling back to first mapping"
        );
    }
    mappings.keys().next().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mappings_from(value: serde_json::Value) -> BTreeMap<String, ProviderMapping> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn choose_provider_prefers_configured_order() {
        let priority = vec!["oanda".to_string(), "simulation".to_string()];
        let mappings = mappings_from(json!({
            "simulation": { "symbol": "EUR/USD", "exchange": "SIM" },
            "oanda": { "symbol": "EUR_USD", "exchange": "OANDA" }
        }));

        assert_eq!(choose_provider(&priority, &mappings).as_deref(), Some("oanda"));
    }

    #[test]
    fn choose_provider_falls_back_to_first_mapping_key() {
        let priority = vec!["oanda".to_string()];
        let mappings = mappings_from(json!({
            "simulation": { "symbol": "BTC/USD", "exchange": "SIM" },
            "cryptoquote": { "symbol": "BTCUSD", "exchange": "CQ" }
        }));

        // neither mapped provider is preferred; smallest key wins
        assert_eq!(
            choose_provider(&priority, &mappings).as_deref(),
            Some("cryptoquote")
        );
    }

    #[test]
    fn choose_provider_returns_none_for_unmapped_instrument() {
        assert_eq!(choose_provider(&[], &BTreeMap::new()), None);
    }
}
