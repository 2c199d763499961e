//! Subscription Directory
//!
//! Owns the instrument list the feed is asked to stream. The list is
//! refreshed wholesale from the store on a fixed cadence (default 24 h);
//! between refreshes, callers get the cached list.
//!
//! The directory has exactly one caller (the supervisor's session-open
//! path), so no internal locking is required.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::application::ports::QuoteStore;
use crate::infrastructure::metrics;

/// Instrument list with scheduled wholesale refresh from the store.
pub struct SubscriptionDirectory {
    store: Arc<dyn QuoteStore>,
    markets: Vec<String>,
    refresh_interval: TimeDelta,
    next_refresh_at: DateTime<Utc>,
}

impl SubscriptionDirectory {
    /// Create a directory that refreshes on the given interval.
    ///
    /// The first `current_list` call always refreshes: the deadline is
    /// initialized to the construction instant.
    #[must_use]
    pub fn new(store: Arc<dyn QuoteStore>, refresh_interval: TimeDelta) -> Self {
        Self {
            store,
            markets: Vec::new(),
            refresh_interval,
            next_refresh_at: Utc::now(),
        }
    }

    /// Current instrument list, refreshing first if the deadline has passed.
    pub async fn current_list(&mut self) -> &[String] {
        self.current_list_at(Utc::now()).await
    }

    /// [`current_list`](Self::current_list) against an explicit instant.
    pub async fn current_list_at(&mut self, now: DateTime<Utc>) -> &[String] {
        if now >= self.next_refresh_at {
            match self.store.instrument_names().await {
                Ok(names) => {
                    // Advance by exactly one interval, not `now + interval`,
                    // so a late call does not drift the cadence.
                    self.next_refresh_at += self.refresh_interval;
                    self.markets = names;
                    metrics::set_subscription_size(self.markets.len());
                    tracing::info!(
                        markets = self.markets.len(),
                        next_refresh_at = %self.next_refresh_at,
                        "Subscription list refreshed"
                    );
                }
                Err(e) => {
                    // Availability over freshness: keep the previous list and
                    // leave the deadline in place so the next call retries.
                    tracing::warn!(error = %e, "Subscription refresh failed, keeping previous list");
                }
            }
        }

        &self.markets
    }

    /// The next scheduled refresh instant.
    #[must_use]
    pub const fn next_refresh_at(&self) -> DateTime<Utc> {
        self.next_refresh_at
    }
}

impl std::fmt::Debug for SubscriptionDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionDirectory")
            .field("markets", &self.markets.len())
            .field("refresh_interval", &self.refresh_interval)
            .field("next_refresh_at", &self.next_refresh_at)
            .finish_non_exhaustive()
    }
}
