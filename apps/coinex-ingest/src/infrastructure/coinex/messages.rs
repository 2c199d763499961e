//! CoinEx Wire Message Types
//!
//! Request and payload types for the CoinEx v2 futures WebSocket API.
//! These map directly to the exchange's JSON schemas and are wire-format
//! contracts; field names and shapes are not negotiable.
//!
//! # Message Types
//!
//! ## Outbound
//! - `AuthRequest`: `server.sign` authentication call
//! - `SubscribeRequest`: `bbo.subscribe` for a market list
//!
//! ## Inbound
//! - `BboPayload`: the `data` object of a BBO push notification
//!
//! # References
//!
//! - [CoinEx Futures WebSocket](https://docs.coinex.com/api/v2/futures/ws)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request id used for the handshake calls.
///
/// The upstream protocol echoes the id in acknowledgments; this client
/// sends both handshake messages with id 1 and does not correlate replies.
const HANDSHAKE_ID: u32 = 1;

// =============================================================================
// Outbound Requests
// =============================================================================

/// Authentication request sent first on every new session.
///
/// # Wire Format (JSON)
/// ```json
/// {
///   "method": "server.sign",
///   "params": {"access_id": "...", "signed_str": "...", "timestamp": 1700000000000},
///   "id": 1
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    /// RPC method (always "server.sign").
    pub method: String,

    /// Authentication parameters.
    pub params: AuthParams,

    /// Request id.
    pub id: u32,
}

/// Parameters of a [`AuthRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthParams {
    /// API access id.
    pub access_id: String,

    /// Pre-signed HMAC secret. Supplied by the credential source; this
    /// client does not re-derive it.
    pub signed_str: String,

    /// Milliseconds since epoch at send time.
    pub timestamp: i64,
}

impl AuthRequest {
    /// Build an authentication request for the given credentials and instant.
    #[must_use]
    pub fn new(access_id: impl Into<String>, signed_str: impl Into<String>, timestamp: i64) -> Self {
        Self {
            method: "server.sign".to_string(),
            params: AuthParams {
                access_id: access_id.into(),
                signed_str: signed_str.into(),
                timestamp,
            },
            id: HANDSHAKE_ID,
        }
    }
}

/// Subscription request naming the full market list for this session.
///
/// # Wire Format (JSON)
/// ```json
/// {"method": "bbo.subscribe", "params": {"market_list": ["BTCUSDT"]}, "id": 1}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    /// RPC method (always "bbo.subscribe").
    pub method: String,

    /// Subscription parameters.
    pub params: SubscribeParams,

    /// Request id.
    pub id: u32,
}

/// Parameters of a [`SubscribeRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeParams {
    /// Instrument names to stream.
    pub market_list: Vec<String>,
}

impl SubscribeRequest {
    /// Build a subscription request for the given markets.
    #[must_use]
    pub fn new(market_list: Vec<String>) -> Self {
        Self {
            method: "bbo.subscribe".to_string(),
            params: SubscribeParams { market_list },
            id: HANDSHAKE_ID,
        }
    }
}

// =============================================================================
// Inbound Payloads
// =============================================================================

/// The `data` object of a BBO push notification.
///
/// Prices and sizes arrive as decimal strings; `updated_at` is milliseconds
/// since epoch.
///
/// # Wire Format (JSON)
/// ```json
/// {
///   "market": "BTCUSDT",
///   "best_bid_price": "60000.1",
///   "best_bid_size": "0.5",
///   "best_ask_price": "60000.5",
///   "best_ask_size": "0.3",
///   "updated_at": 1700000000000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BboPayload {
    /// Instrument name.
    pub market: String,

    /// Best bid price.
    #[serde(with = "rust_decimal::serde::str")]
    pub best_bid_price: Decimal,

    /// Size at the best bid.
    #[serde(with = "rust_decimal::serde::str")]
    pub best_bid_size: Decimal,

    /// Best ask price.
    #[serde(with = "rust_decimal::serde::str")]
    pub best_ask_price: Decimal,

    /// Size at the best ask.
    #[serde(with = "rust_decimal::serde::str")]
    pub best_ask_size: Decimal,

    /// Source event timestamp, milliseconds since epoch.
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_request_wire_shape() {
        let req = AuthRequest::new("key", "sig", 1_700_000_000_000);
        let json: serde_json::Value = serde_json::to_value(&req).unwrap();

        assert_eq!(json["method"], "server.sign");
        assert_eq!(json["id"], 1);
        assert_eq!(json["params"]["access_id"], "key");
        assert_eq!(json["params"]["signed_str"], "sig");
        assert_eq!(json["params"]["timestamp"], 1_700_000_000_000_i64);
    }

    #[test]
    fn subscribe_request_wire_shape() {
        let req = SubscribeRequest::new(vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]);
        let json: serde_json::Value = serde_json::to_value(&req).unwrap();

        assert_eq!(json["method"], "bbo.subscribe");
        assert_eq!(json["id"], 1);
        assert_eq!(
            json["params"]["market_list"],
            serde_json::json!(["BTCUSDT", "ETHUSDT"])
        );
    }

    #[test]
    fn bbo_payload_decodes_decimal_strings() {
        let json = r#"{
            "market": "BTCUSDT",
            "best_bid_price": "60000.1",
            "best_bid_size": "0.5",
            "best_ask_price": "60000.5",
            "best_ask_size": "0.3",
            "updated_at": 1700000000000
        }"#;

        let payload: BboPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.market, "BTCUSDT");
        assert_eq!(payload.best_bid_price, Decimal::new(600_001, 1));
        assert_eq!(payload.best_ask_size, Decimal::new(3, 1));
        assert_eq!(payload.updated_at, 1_700_000_000_000);
    }
}
