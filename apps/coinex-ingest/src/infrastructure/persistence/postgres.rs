//! PostgreSQL Quote Store
//!
//! `sqlx`-backed implementation of the `QuoteStore` port against the
//! ingestion schema:
//!
//! ```sql
//! CREATE TABLE coins_table (
//!     coin_id   SERIAL PRIMARY KEY,
//!     coin_name TEXT NOT NULL UNIQUE
//! );
//! CREATE TABLE coin_data_table (
//!     coin_id      INTEGER NOT NULL REFERENCES coins_table (coin_id),
//!     timestamp    TIMESTAMPTZ NOT NULL,
//!     best_bid     NUMERIC NOT NULL,
//!     best_ask     NUMERIC NOT NULL,
//!     best_bid_qty NUMERIC NOT NULL,
//!     best_ask_qty NUMERIC NOT NULL,
//!     mark_price   NUMERIC,
//!     last_price   NUMERIC,
//!     updated_at   TIMESTAMPTZ NOT NULL,
//!     exchange     TEXT NOT NULL
//! );
//! ```
//!
//! Instrument resolution rides the unique constraint on `coin_name`:
//! `INSERT ... ON CONFLICT DO NOTHING RETURNING` plus a fallback re-lookup,
//! so two connections racing on first sight of the same name converge on a
//! single id with exactly one row.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};

use crate::application::ports::{QuoteStore, StoreError};
use crate::domain::quote::{EXCHANGE, QuoteUpdate};

/// PostgreSQL implementation of the `QuoteStore` port.
#[derive(Debug, Clone)]
pub struct PgQuoteStore {
    pool: PgPool,
}

impl PgQuoteStore {
    /// Connect to the database and build a pooled store.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be established.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Build a store from an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Health check: run a trivial query against the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }

    /// Resolve an instrument id inside an open transaction.
    async fn resolve_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> Result<i32, StoreError> {
        let existing: Option<i32> =
            sqlx::query_scalar("SELECT coin_id FROM coins_table WHERE coin_name = $1")
                .bind(name)
                .fetch_optional(&mut **tx)
                .await
                .map_err(query_err)?;

        if let Some(id) = existing {
            return Ok(id);
        }

        // First sight. DO NOTHING suppresses the duplicate when another
        // connection wins the race; the re-lookup then observes its row.
        let inserted: Option<i32> = sqlx::query_scalar(
            "INSERT INTO coins_table (coin_name) VALUES ($1)
             ON CONFLICT (coin_name) DO NOTHING
             RETURNING coin_id",
        )
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .map_err(query_err)?;

        match inserted {
            Some(id) => Ok(id),
            None => sqlx::query_scalar("SELECT coin_id FROM coins_table WHERE coin_name = $1")
                .bind(name)
                .fetch_one(&mut **tx)
                .await
                .map_err(query_err),
        }
    }
}

#[async_trait]
impl QuoteStore for PgQuoteStore {
    async fn instrument_names(&self) -> Result<Vec<String>, StoreError> {
        sqlx::query_scalar("SELECT coin_name FROM coins_table ORDER BY coin_id")
            .fetch_all(&self.pool)
            .await
            .map_err(query_err)
    }

    async fn resolve_instrument(&self, name: &str) -> Result<i32, StoreError> {
        let mut tx = self.pool.begin().await.map_err(query_err)?;
        let id = Self::resolve_in_tx(&mut tx, name).await?;
        tx.commit().await.map_err(query_err)?;

        Ok(id)
    }

    async fn record_quote(&self, update: &QuoteUpdate) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(query_err)?;
        let coin_id = Self::resolve_in_tx(&mut tx, &update.market).await?;

        sqlx::query(
            "INSERT INTO coin_data_table (
                coin_id, timestamp, best_bid, best_ask, best_bid_qty,
                best_ask_qty, mark_price, last_price, updated_at, exchange
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(coin_id)
        .bind(update.updated_at)
        .bind(update.best_bid)
        .bind(update.best_ask)
        .bind(update.best_bid_qty)
        .bind(update.best_ask_qty)
        .bind(update.mark_price)
        .bind(update.last_price)
        .bind(update.ingested_at)
        .bind(EXCHANGE)
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        tx.commit().await.map_err(query_err)?;

        Ok(())
    }
}

fn query_err(e: sqlx::Error) -> StoreError {
    StoreError::Query(e.to_string())
}
