//! Response payloads served by the query API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tickrelay_core::Asset;

/// Price snapshot of one asset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub instrument_id: String,
    pub symbol: String,
    pub kind: String,
    pub provider: String,
    /// Last streamed price. Null until the first update arrives.
    pub price: Option<Decimal>,
    /// Exchange timestamp of the last update.
    pub last_updated: Option<DateTime<Utc>>,
}

impl From<Asset> for PriceSnapshot {
    fn from(asset: Asset) -> Self {
        Self {
            instrument_id: asset.instrument_id,
            symbol: asset.symbol,
            kind: asset.kind,
            provider: asset.provider,
            price: asset.latest_price,
            last_updated: asset.last_updated,
        }
    }
}

/// Running state of the catalog synchronizer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SyncStatus {
    pub running: bool,
}

/// Error body for non-2xx responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tickrelay_core::PriceQuote;

    #[test]
    fn test_price_snapshot_serializes_camel_case() {
        let mut asset = Asset::new("inst-1", "EUR/USD", "forex", "oanda");
        asset.apply_quote(&PriceQuote::new(
            dec!(1.0845),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        ));

        let json = serde_json::to_value(PriceSnapshot::from(asset)).unwrap();

        assert_eq!(json["instrumentId"], "inst-1");
        assert_eq!(json["symbol"], "EUR/USD");
        assert_eq!(json["price"], "1.0845");
        assert_eq!(json["lastUpdated"], "2024-03-01T12:00:00Z");
    }

    #[test]
    fn test_snapshot_of_a_never_ticked_asset_has_nulls() {
        let json =
            serde_json::to_value(PriceSnapshot::from(Asset::new("inst-2", "US500", "index", "sim")))
                .unwrap();

        assert!(json["price"].is_null());
        assert!(json["lastUpdated"].is_null());
    }
}
