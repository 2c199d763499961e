//! In-memory quote store for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::ports::{QuoteStore, StoreError};
use crate::domain::quote::QuoteUpdate;

/// One persisted row, as the in-memory store records it.
#[derive(Debug, Clone)]
pub struct StoredQuote {
    /// Resolved instrument id.
    pub coin_id: i32,
    /// The persisted update.
    pub update: QuoteUpdate,
}

/// In-memory implementation of `QuoteStore`.
///
/// Suitable for testing and development. Not for production use.
/// Supports one-shot failure injection via [`fail_next_write`](Self::fail_next_write).
#[derive(Debug, Default)]
pub struct InMemoryQuoteStore {
    instruments: RwLock<Vec<String>>,
    ids: RwLock<HashMap<String, i32>>,
    quotes: RwLock<Vec<StoredQuote>>,
    fail_next: AtomicBool,
}

impl InMemoryQuoteStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with instrument names (for test setup).
    #[must_use]
    pub fn with_instruments(names: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut instruments = store.instruments.write();
            let mut ids = store.ids.write();
            for (i, name) in names.iter().enumerate() {
                instruments.push((*name).to_string());
                ids.insert((*name).to_string(), i32::try_from(i).unwrap_or(i32::MAX) + 1);
            }
        }
        store
    }

    /// Make the next `record_quote` call fail with a query error.
    pub fn fail_next_write(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// All quote rows recorded so far.
    #[must_use]
    pub fn quotes(&self) -> Vec<StoredQuote> {
        self.quotes.read().clone()
    }

    /// Number of instrument rows.
    #[must_use]
    pub fn instrument_count(&self) -> usize {
        self.instruments.read().len()
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn instrument_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.instruments.read().clone())
    }

    async fn resolve_instrument(&self, name: &str) -> Result<i32, StoreError> {
        if let Some(id) = self.ids.read().get(name) {
            return Ok(*id);
        }

        let mut instruments = self.instruments.write();
        let mut ids = self.ids.write();
        // Re-check under the write locks; another caller may have won.
        if let Some(id) = ids.get(name) {
            return Ok(*id);
        }

        instruments.push(name.to_string());
        let id = i32::try_from(instruments.len()).unwrap_or(i32::MAX);
        ids.insert(name.to_string(), id);

        Ok(id)
    }

    async fn record_quote(&self, update: &QuoteUpdate) -> Result<(), StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Query("injected failure".to_string()));
        }

        let coin_id = self.resolve_instrument(&update.market).await?;
        self.quotes.write().push(StoredQuote {
            coin_id,
            update: update.clone(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn update(market: &str) -> QuoteUpdate {
        QuoteUpdate {
            market: market.to_string(),
            best_bid: Decimal::new(600_001, 1),
            best_ask: Decimal::new(600_005, 1),
            best_bid_qty: Decimal::new(5, 1),
            best_ask_qty: Decimal::new(3, 1),
            mark_price: None,
            last_price: None,
            updated_at: Utc::now(),
            ingested_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn resolve_is_idempotent() {
        let store = InMemoryQuoteStore::new();

        let first = store.resolve_instrument("BTCUSDT").await.unwrap();
        let second = store.resolve_instrument("BTCUSDT").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.instrument_count(), 1);
    }

    #[tokio::test]
    async fn resolve_assigns_distinct_ids() {
        let store = InMemoryQuoteStore::new();

        let btc = store.resolve_instrument("BTCUSDT").await.unwrap();
        let eth = store.resolve_instrument("ETHUSDT").await.unwrap();

        assert_ne!(btc, eth);
        assert_eq!(store.instrument_count(), 2);
    }

    #[tokio::test]
    async fn record_quote_appends_rows() {
        let store = InMemoryQuoteStore::new();

        store.record_quote(&update("BTCUSDT")).await.unwrap();
        store.record_quote(&update("BTCUSDT")).await.unwrap();

        let rows = store.quotes();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].coin_id, rows[1].coin_id);
    }

    #[tokio::test]
    async fn injected_failure_is_one_shot() {
        let store = InMemoryQuoteStore::new();
        store.fail_next_write();

        assert!(store.record_quote(&update("BTCUSDT")).await.is_err());
        assert!(store.record_quote(&update("BTCUSDT")).await.is_ok());
        assert_eq!(store.quotes().len(), 1);
    }

    #[tokio::test]
    async fn seeded_instruments_are_listed_in_order() {
        let store = InMemoryQuoteStore::with_instruments(&["BTCUSDT", "ETHUSDT"]);

        let names = store.instrument_names().await.unwrap();
        assert_eq!(names, vec!["BTCUSDT", "ETHUSDT"]);
    }
}
