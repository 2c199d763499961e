//! Frame Codec
//!
//! Decodes raw CoinEx transport frames. The exchange wraps every push
//! notification in gzip compression; the decompressed bytes are a JSON
//! envelope with an optional `data` payload.
//!
//! Decode failures are per-message errors: the supervisor logs and drops
//! the frame without tearing down the session.

use std::io::Read;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

/// Codec errors.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Gzip decompression failed.
    #[error("decompression failed: {0}")]
    Decompress(#[from] std::io::Error),

    /// The decompressed bytes are not well-formed JSON.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decoded message envelope.
///
/// Push notifications carry `method` and `data`; acknowledgments for the
/// handshake calls carry `id` and no `data`. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// Notification method (e.g. "bbo.update"), absent on acknowledgments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Notification payload; present only on data pushes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Request id echoed on acknowledgments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Envelope {
    /// Whether this envelope carries a data payload.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.data.is_some()
    }
}

/// Gzip + JSON codec for CoinEx binary frames.
#[derive(Debug, Default, Clone)]
pub struct FrameCodec;

impl FrameCodec {
    /// Create a new frame codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode one compressed binary frame into an [`Envelope`].
    ///
    /// # Errors
    ///
    /// Returns an error if decompression fails or the payload is not
    /// well-formed JSON.
    pub fn decode(&self, frame: &[u8]) -> Result<Envelope, DecodeError> {
        let mut decoder = GzDecoder::new(frame);
        let mut text = String::new();
        decoder.read_to_string(&mut text)?;

        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn decode_bbo_notification() {
        let codec = FrameCodec::new();
        let frame = gzip(
            r#"{"method":"bbo.update","data":{"market":"BTCUSDT","best_bid_price":"60000.1"}}"#,
        );

        let envelope = codec.decode(&frame).unwrap();
        assert_eq!(envelope.method.as_deref(), Some("bbo.update"));
        assert!(envelope.has_data());
        assert_eq!(envelope.data.unwrap()["market"], "BTCUSDT");
    }

    #[test]
    fn decode_acknowledgment_without_data() {
        let codec = FrameCodec::new();
        let frame = gzip(r#"{"id":1,"code":0,"message":"OK"}"#);

        let envelope = codec.decode(&frame).unwrap();
        assert_eq!(envelope.id, Some(1));
        assert!(!envelope.has_data());
    }

    #[test]
    fn decode_rejects_uncompressed_bytes() {
        let codec = FrameCodec::new();
        let err = codec.decode(br#"{"method":"bbo.update"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Decompress(_)));
    }

    #[test]
    fn decode_rejects_truncated_gzip() {
        let codec = FrameCodec::new();
        let mut frame = gzip(r#"{"method":"bbo.update","data":{}}"#);
        frame.truncate(frame.len() / 2);

        let err = codec.decode(&frame).unwrap_err();
        assert!(matches!(err, DecodeError::Decompress(_)));
    }

    #[test]
    fn decode_rejects_non_json_payload() {
        let codec = FrameCodec::new();
        let frame = gzip("not json at all");

        let err = codec.decode(&frame).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
