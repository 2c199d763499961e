//! CoinEx WebSocket Adapter
//!
//! Implements the client side of the CoinEx v2 futures BBO stream:
//!
//! - **codec**: gzip + JSON frame decoding
//! - **messages**: wire-format request/response types
//! - **normalize**: exchange payload -> canonical quote record
//! - **reconnect**: retry delay policy
//! - **client**: connection supervisor (connect, auth, subscribe, dispatch)

pub mod client;
pub mod codec;
pub mod messages;
pub mod normalize;
pub mod reconnect;

pub use client::{BboClient, BboClientConfig, BboClientError};
pub use codec::{DecodeError, Envelope, FrameCodec};
pub use messages::{AuthRequest, BboPayload, SubscribeRequest};
pub use normalize::{MalformedQuoteError, normalize};
pub use reconnect::{ReconnectConfig, ReconnectPolicy};
