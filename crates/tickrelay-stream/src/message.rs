//! Wire types for the streaming endpoint.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tickrelay_core::PriceQuote;
use uuid::Uuid;

/// Frame type of a subscription request.
pub const L1_SUBSCRIPTION: &str = "l1-subscription";

/// Frame type of a last-trade update.
pub const L1_UPDATE: &str = "l1-update";

// ============================================================================
// Subscription Request (Outgoing)
// ============================================================================

/// Subscription request for one instrument on one provider.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest {
    /// Frame type, always "l1-subscription".
    #[serde(rename = "type")]
    pub request_type: String,
    /// Correlation id echoed back by the server.
    pub id: String,
    /// Platform instrument id.
    #[serde(rename = "instrumentId")]
    pub instrument_id: String,
    /// Data provider the subscription is routed to.
    pub provider: String,
    /// True to subscribe, false to unsubscribe.
    pub subscribe: bool,
    /// Quote kinds to receive. This service only consumes "last".
    pub kinds: Vec<String>,
}

impl SubscribeRequest {
    /// Create a last-trade subscription with a fresh correlation id.
    pub fn last_trade(instrument_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            request_type: L1_SUBSCRIPTION.to_string(),
            id: Uuid::new_v4().to_string(),
            instrument_id: instrument_id.into(),
            provider: provider.into(),
            subscribe: true,
            kinds: vec!["last".to_string()],
        }
    }
}

// ============================================================================
// Price Update (Incoming)
// ============================================================================

/// Incoming streaming frame, reduced to the fields this service reads.
///
/// The endpoint also emits session greetings and subscription ACKs; those
/// parse with `frame_type` set to something other than "l1-update" and are
/// ignored by the caller. The upstream is not consistent about field casing,
/// hence the aliases.
#[derive(Debug, Clone, Deserialize)]
pub struct TickFrame {
    /// Frame type discriminator.
    #[serde(rename = "type", alias = "Type", default)]
    pub frame_type: String,
    /// Instrument the update belongs to.
    #[serde(rename = "instrumentId", alias = "InstrumentId", default)]
    pub instrument_id: String,
    /// Last-trade payload. Absent on non-price frames.
    #[serde(default, alias = "Last")]
    pub last: Option<LastQuote>,
}

impl TickFrame {
    /// True when the frame is an l1 update carrying a last-trade payload.
    pub fn is_price_update(&self) -> bool {
        self.frame_type == L1_UPDATE && self.last.is_some()
    }
}

/// Last-trade payload of an l1 update.
#[derive(Debug, Clone, Deserialize)]
pub struct LastQuote {
    /// Trade price.
    #[serde(alias = "Price")]
    pub price: Decimal,
    /// Exchange timestamp of the trade.
    #[serde(alias = "Timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl From<LastQuote> for PriceQuote {
    fn from(last: LastQuote) -> Self {
        PriceQuote::new(last.price, last.timestamp)
    }
}
