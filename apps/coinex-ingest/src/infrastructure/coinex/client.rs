//! BBO WebSocket Client
//!
//! Connection supervisor for the CoinEx v2 futures BBO stream. Owns the
//! full socket lifecycle: connect, authenticate, subscribe, dispatch
//! inbound frames, and reconnect after close or transport error.
//!
//! # Session sequence
//!
//! On every new connection, exactly once and in order:
//!
//! 1. send the `server.sign` authentication request (millisecond timestamp)
//! 2. fetch the current instrument list from the subscription directory
//! 3. send the `bbo.subscribe` request naming that list
//!
//! No authentication acknowledgment is awaited before subscribing; the
//! transport preserves send order and the server processes both in
//! sequence. A rejected authentication surfaces as a server-side close and
//! takes the generic reconnect path.
//!
//! # Failure containment
//!
//! Only transport-class errors reach the outer loop and tear the session
//! down. Decode failures, malformed quotes, and persistence failures are
//! contained to the single affected message: logged, counted, dropped.

use std::sync::Arc;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::codec::FrameCodec;
use super::messages::{AuthRequest, SubscribeRequest};
use super::normalize::normalize;
use super::reconnect::{ReconnectConfig, ReconnectPolicy};
use crate::application::ports::QuoteStore;
use crate::infrastructure::config::Credentials;
use crate::infrastructure::directory::SubscriptionDirectory;
use crate::infrastructure::metrics;

// =============================================================================
// Error Type
// =============================================================================

/// Transport-class errors that tear down the session.
#[derive(Debug, thiserror::Error)]
pub enum BboClientError {
    /// WebSocket error (connect, send, or receive).
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A handshake request could not be serialized.
    #[error("handshake serialization failed: {0}")]
    Handshake(#[from] serde_json::Error),

    /// The server closed the connection or the stream ended.
    #[error("connection closed")]
    ConnectionClosed,

    /// Maximum reconnection attempts exceeded.
    #[error("maximum reconnection attempts exceeded")]
    MaxReconnectAttemptsExceeded,
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for the BBO client.
#[derive(Debug, Clone)]
pub struct BboClientConfig {
    /// WebSocket URL.
    pub url: String,
    /// API credentials.
    pub credentials: Credentials,
    /// Reconnection configuration.
    pub reconnect: ReconnectConfig,
}

impl BboClientConfig {
    /// Create a new configuration with the default reconnect policy.
    #[must_use]
    pub fn new(url: String, credentials: Credentials) -> Self {
        Self {
            url,
            credentials,
            reconnect: ReconnectConfig::default(),
        }
    }
}

// =============================================================================
// BBO Client
// =============================================================================

/// BBO WebSocket client and session supervisor.
///
/// Runs one logical session at a time; events within a session are
/// dispatched sequentially, and persistence is synchronous in the dispatch
/// path (a slow store throttles ingestion rather than building a queue).
pub struct BboClient {
    config: BboClientConfig,
    codec: FrameCodec,
    store: Arc<dyn QuoteStore>,
    directory: SubscriptionDirectory,
    cancel: CancellationToken,
}

impl BboClient {
    /// Create a new BBO client.
    #[must_use]
    pub fn new(
        config: BboClientConfig,
        store: Arc<dyn QuoteStore>,
        directory: SubscriptionDirectory,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            codec: FrameCodec::new(),
            store,
            directory,
            cancel,
        }
    }

    /// Run the client connection loop.
    ///
    /// Connects, performs the session handshake, and processes messages
    /// until cancelled. On transport error the session is torn down, the
    /// reconnect delay elapses, and the full sequence is redone on a fresh
    /// connection (an explicit loop, so indefinite reconnection does not
    /// grow the stack).
    ///
    /// # Errors
    ///
    /// Returns an error only if the reconnect attempt budget is exhausted
    /// (never with the default unlimited policy).
    pub async fn run(mut self) -> Result<(), BboClientError> {
        let mut reconnect_policy = ReconnectPolicy::new(self.config.reconnect.clone());

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("BBO client cancelled");
                return Ok(());
            }

            match self.connect_and_run(&mut reconnect_policy).await {
                Ok(()) => {
                    tracing::info!("BBO session closed by shutdown");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "BBO connection error");

                    let Some(delay) = reconnect_policy.next_delay() else {
                        return Err(BboClientError::MaxReconnectAttemptsExceeded);
                    };

                    metrics::record_reconnect();
                    tracing::info!(
                        attempt = reconnect_policy.attempt_count(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Reconnecting to BBO stream"
                    );

                    tokio::select! {
                        () = self.cancel.cancelled() => {
                            tracing::info!("BBO client cancelled during reconnect delay");
                            return Ok(());
                        }
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// Connect, handshake, and dispatch until error or cancellation.
    ///
    /// The previous session's transport handle is dropped with this call
    /// frame, so reconnection never leaks resources.
    async fn connect_and_run(
        &mut self,
        reconnect_policy: &mut ReconnectPolicy,
    ) -> Result<(), BboClientError> {
        tracing::info!(url = %self.config.url, "Connecting to BBO stream");

        let (ws_stream, _response) = tokio_tungstenite::connect_async(&self.config.url).await?;
        let (mut write, mut read) = ws_stream.split();

        let auth = AuthRequest::new(
            self.config.credentials.access_id(),
            self.config.credentials.signed_str(),
            Utc::now().timestamp_millis(),
        );
        write
            .send(Message::Text(serde_json::to_string(&auth)?.into()))
            .await?;
        tracing::debug!("Sent authentication request");

        let markets = self.directory.current_list().await.to_vec();
        let market_count = markets.len();
        let subscribe = SubscribeRequest::new(markets);
        write
            .send(Message::Text(serde_json::to_string(&subscribe)?.into()))
            .await?;
        tracing::info!(markets = market_count, "Sent subscription request");

        // The handshake made it onto the wire; future failures start a
        // fresh backoff schedule.
        reconnect_policy.reset();

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    return Ok(());
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Binary(frame))) => {
                            self.process_frame(&frame).await;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(frame = ?frame, "Server sent close frame");
                            return Err(BboClientError::ConnectionClosed);
                        }
                        Some(Ok(_)) => {
                            // Text and pong frames carry nothing for this feed.
                        }
                        Some(Err(e)) => {
                            return Err(e.into());
                        }
                        None => {
                            tracing::info!("WebSocket stream ended");
                            return Err(BboClientError::ConnectionClosed);
                        }
                    }
                }
            }
        }
    }

    /// Process one inbound binary frame.
    ///
    /// Every stage failure (decode, normalize, persist) is isolated to this
    /// frame; the session continues regardless of the outcome.
    pub async fn process_frame(&self, frame: &[u8]) {
        metrics::record_frame_received();

        let envelope = match self.codec.decode(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                metrics::record_frame_dropped("decode");
                tracing::warn!(error = %e, "Dropping undecodable frame");
                return;
            }
        };

        let Some(data) = envelope.data else {
            tracing::trace!(
                method = envelope.method.as_deref().unwrap_or_default(),
                id = envelope.id,
                "Control message"
            );
            return;
        };

        let update = match normalize(&data) {
            Ok(update) => update,
            Err(e) => {
                metrics::record_frame_dropped("malformed");
                tracing::warn!(error = %e, payload = %data, "Dropping malformed quote");
                return;
            }
        };

        match self.store.record_quote(&update).await {
            Ok(()) => metrics::record_quote_persisted(),
            Err(e) => {
                metrics::record_store_error();
                tracing::error!(
                    error = %e,
                    market = %update.market,
                    "Failed to persist quote, dropping tick"
                );
            }
        }
    }
}
