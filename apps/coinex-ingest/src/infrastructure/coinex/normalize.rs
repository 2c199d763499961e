//! Quote Normalizer
//!
//! Maps the `data` payload of a decoded BBO notification into the canonical
//! [`QuoteUpdate`] record. Pure: no I/O, no clock beyond stamping the
//! ingestion time.
//!
//! A malformed payload is dropped by the caller without retry; a quote tick
//! is superseded by the next tick, so there is nothing to recover.

use chrono::{DateTime, TimeZone, Utc};

use super::messages::BboPayload;
use crate::domain::quote::QuoteUpdate;

/// Normalization errors.
#[derive(Debug, thiserror::Error)]
pub enum MalformedQuoteError {
    /// A required field is missing or has the wrong shape.
    #[error("missing or invalid field: {0}")]
    Field(#[from] serde_json::Error),

    /// `updated_at` is outside the representable timestamp range.
    #[error("timestamp out of range: {0}")]
    Timestamp(i64),
}

/// Normalize a BBO `data` payload into a [`QuoteUpdate`].
///
/// Required fields: `market`, `best_bid_price`, `best_bid_size`,
/// `best_ask_price`, `best_ask_size`, `updated_at` (ms since epoch).
/// Mark price and last trade price are not published on this feed and are
/// always recorded as absent.
///
/// # Errors
///
/// Returns an error if any required field is missing, of the wrong shape,
/// or the timestamp is out of range.
pub fn normalize(data: &serde_json::Value) -> Result<QuoteUpdate, MalformedQuoteError> {
    let payload: BboPayload = serde_json::from_value(data.clone())?;

    Ok(QuoteUpdate {
        market: payload.market,
        best_bid: payload.best_bid_price,
        best_ask: payload.best_ask_price,
        best_bid_qty: payload.best_bid_size,
        best_ask_qty: payload.best_ask_size,
        mark_price: None,
        last_price: None,
        updated_at: millis_to_datetime(payload.updated_at)?,
        ingested_at: Utc::now(),
    })
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, MalformedQuoteError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(MalformedQuoteError::Timestamp(millis))
}
