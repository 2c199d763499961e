//! Canonical Quote Update Record
//!
//! The normalized shape of one best-bid/offer snapshot, independent of the
//! exchange wire format. One record is persisted per received update;
//! records are append-only and never mutated after construction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exchange tag written with every persisted quote row.
pub const EXCHANGE: &str = "COINEX";

/// One best-bid/offer snapshot for an instrument at a point in time.
///
/// Mark price and last trade price are carried as options because the BBO
/// feed variant does not publish them; they persist as NULL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteUpdate {
    /// Instrument symbolic name (e.g. "BTCUSDT").
    pub market: String,

    /// Best bid price.
    pub best_bid: Decimal,

    /// Best ask price.
    pub best_ask: Decimal,

    /// Size available at the best bid.
    pub best_bid_qty: Decimal,

    /// Size available at the best ask.
    pub best_ask_qty: Decimal,

    /// Mark price, absent in the BBO feed.
    pub mark_price: Option<Decimal>,

    /// Last trade price, absent in the BBO feed.
    pub last_price: Option<Decimal>,

    /// Source event timestamp, converted from the feed's millisecond epoch.
    pub updated_at: DateTime<Utc>,

    /// Wall-clock time this process constructed the record.
    pub ingested_at: DateTime<Utc>,
}

impl QuoteUpdate {
    /// Mid price of the quoted spread, if the book is two-sided.
    #[must_use]
    pub fn mid_price(&self) -> Option<Decimal> {
        if self.best_bid.is_zero() && self.best_ask.is_zero() {
            None
        } else {
            Some((self.best_bid + self.best_ask) / Decimal::TWO)
        }
    }

    /// Quoted spread (ask minus bid).
    #[must_use]
    pub fn spread(&self) -> Decimal {
        self.best_ask - self.best_bid
    }
}
