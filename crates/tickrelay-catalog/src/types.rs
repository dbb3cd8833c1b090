//! Wire types for the instruments and history endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One page of the paginated instruments listing.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentsPage {
    pub paging: PagingInfo,
    #[serde(default)]
    pub data: Vec<InstrumentRecord>,
}

/// Paging envelope of the instruments listing.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PagingInfo {
    pub page: u32,
    pub pages: u32,
    #[serde(default)]
    pub items: u64,
}

/// A single instrument as listed by the platform.
///
/// `mappings` keys are provider names. A `BTreeMap` keeps iteration order
/// defined regardless of upstream JSON field order.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentRecord {
    pub id: String,
    pub symbol: String,
    pub kind: String,
    #[serde(default)]
    pub mappings: BTreeMap<String, ProviderMapping>,
}

/// Provider-specific listing details for an instrument.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMapping {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub exchange: String,
}

/// Historical candle listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CandleHistory {
    #[serde(default)]
    pub data: Vec<Candle>,
}

/// One OHLCV bar. Serialized back out by the query façade as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub t: DateTime<Utc>,
    pub o: Decimal,
    pub h: Decimal,
    pub l: Decimal,
    pub c: Decimal,
    #[serde(default)]
    pub v: u64,
}

/// Parameters for a history query.
#[derive(Debug, Clone)]
pub struct HistoryRequest {
    pub instrument_id: String,
    pub provider: String,
    /// Bar width multiplier, e.g. `1`.
    pub interval: u32,
    /// Bar width unit, e.g. `minute`, `hour`, `day`.
    pub periodicity: String,
    pub start_date: NaiveDate,
    /// Defaults to today (UTC) when absent.
    pub end_date: Option<NaiveDate>,
}
