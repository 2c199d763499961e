//! Stream Session Integration Tests
//!
//! Runs the full client against a local WebSocket server: handshake order,
//! frame dispatch, and reconnection with a fresh handshake per session.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use flate2::Compression;
use flate2::write::GzEncoder;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use coinex_ingest::{
    BboClient, BboClientConfig, Credentials, InMemoryQuoteStore, QuoteStore, ReconnectConfig,
    SubscriptionDirectory,
};

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn bbo_frame(market: &str) -> Vec<u8> {
    gzip(&format!(
        r#"{{"method":"bbo.update","data":{{
            "market":"{market}",
            "best_bid_price":"60000.1",
            "best_bid_size":"0.5",
            "best_ask_price":"60000.5",
            "best_ask_size":"0.3",
            "updated_at":1700000000000
        }}}}"#
    ))
}

/// Handshake messages observed by the server for one session.
#[derive(Debug)]
struct Handshake {
    auth: serde_json::Value,
    subscribe: serde_json::Value,
}

async fn read_handshake(
    ws: &mut tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
) -> Handshake {
    let mut texts = Vec::new();
    while texts.len() < 2 {
        match ws.next().await.expect("client hung up mid-handshake").unwrap() {
            Message::Text(text) => texts.push(serde_json::from_str(text.as_str()).unwrap()),
            _ => {}
        }
    }
    let subscribe = texts.pop().unwrap();
    let auth = texts.pop().unwrap();
    Handshake { auth, subscribe }
}

async fn wait_for_rows(store: &InMemoryQuoteStore, expected: usize) {
    for _ in 0..100 {
        if store.quotes().len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "timed out waiting for {expected} rows, have {}",
        store.quotes().len()
    );
}

#[tokio::test]
async fn session_handshake_dispatch_and_reconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let store = Arc::new(InMemoryQuoteStore::with_instruments(&["BTCUSDT"]));
    let directory = SubscriptionDirectory::new(
        Arc::clone(&store) as Arc<dyn QuoteStore>,
        TimeDelta::hours(24),
    );

    let config = BboClientConfig {
        url: format!("ws://{addr}"),
        credentials: Credentials::new("test-key", "test-secret").unwrap(),
        reconnect: ReconnectConfig {
            initial_delay: Duration::from_millis(50),
            ..Default::default()
        },
    };

    let cancel = CancellationToken::new();
    let client = BboClient::new(
        config,
        Arc::clone(&store) as Arc<dyn QuoteStore>,
        directory,
        cancel.clone(),
    );
    let client_handle = tokio::spawn(client.run());

    let (handshake_tx, mut handshake_rx) = mpsc::channel::<Handshake>(4);

    // Session 1: take the handshake, push one frame, then drop the socket.
    let server_handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        handshake_tx.send(read_handshake(&mut ws).await).await.unwrap();
        ws.send(Message::Binary(bbo_frame("BTCUSDT").into()))
            .await
            .unwrap();
        drop(ws);

        // Session 2: the client must redo the full handshake.
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        handshake_tx.send(read_handshake(&mut ws).await).await.unwrap();
        ws.send(Message::Binary(bbo_frame("BTCUSDT").into()))
            .await
            .unwrap();

        // Hold the session open until the client shuts down.
        while let Some(Ok(_)) = ws.next().await {}
    });

    let first = handshake_rx.recv().await.unwrap();
    assert_eq!(first.auth["method"], "server.sign");
    assert_eq!(first.auth["id"], 1);
    assert_eq!(first.auth["params"]["access_id"], "test-key");
    assert_eq!(first.auth["params"]["signed_str"], "test-secret");
    assert!(first.auth["params"]["timestamp"].is_i64());
    assert_eq!(first.subscribe["method"], "bbo.subscribe");
    assert_eq!(
        first.subscribe["params"]["market_list"],
        serde_json::json!(["BTCUSDT"])
    );

    // The reconnect re-sends authentication and subscription in full.
    let second = handshake_rx.recv().await.unwrap();
    assert_eq!(second.auth["method"], "server.sign");
    assert_eq!(second.subscribe["method"], "bbo.subscribe");
    assert_eq!(
        second.subscribe["params"]["market_list"],
        serde_json::json!(["BTCUSDT"])
    );

    // One frame per session made it into the store.
    wait_for_rows(&store, 2).await;

    cancel.cancel();
    client_handle.await.unwrap().unwrap();
    server_handle.abort();
}
