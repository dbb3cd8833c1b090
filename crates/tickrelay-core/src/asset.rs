//! Asset and price quote types.
//!
//! An `Asset` carries two groups of fields with separate ownership:
//! identity fields (`symbol`, `kind`, `provider`) written by catalog
//! synchronization, and price fields (`latest_price`, `last_updated`)
//! written by the streaming path. No writer touches the other group.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tradable instrument tracked by the service.
///
/// `instrument_id` is the unique key, assigned by the upstream platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Upstream instrument identifier (unique key).
    pub instrument_id: String,
    /// Display symbol, e.g. `EUR/USD`.
    pub symbol: String,
    /// Instrument class, e.g. `forex`, `crypto`.
    pub kind: String,
    /// Upstream venue this instrument is subscribed under.
    pub provider: String,
    /// Last traded price, absent until the first tick arrives.
    pub latest_price: Option<Decimal>,
    /// Timestamp of the last traded price.
    pub last_updated: Option<DateTime<Utc>>,
}

impl Asset {
    /// Create an asset with identity fields only; price fields start empty.
    pub fn new(
        instrument_id: impl Into<String>,
        symbol: impl Into<String>,
        kind: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            symbol: symbol.into(),
            kind: kind.into(),
            provider: provider.into(),
            latest_price: None,
            last_updated: None,
        }
    }

    /// True if any identity field differs from `other`.
    ///
    /// Price fields are not part of the comparison; catalog reconciliation
    /// uses this to decide whether an identity rewrite is needed at all.
    pub fn identity_differs(&self, other: &Asset) -> bool {
        self.symbol != other.symbol || self.kind != other.kind || self.provider != other.provider
    }

    /// Record a last-trade observation onto the price fields.
    pub fn apply_quote(&mut self, quote: &PriceQuote) {
        self.latest_price = Some(quote.price);
        self.last_updated = Some(quote.timestamp);
    }

    /// True once at least one tick has been applied.
    pub fn has_price(&self) -> bool {
        self.latest_price.is_some()
    }
}

/// A single last-trade observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl PriceQuote {
    pub fn new(price: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self { price, timestamp }
    }
}
