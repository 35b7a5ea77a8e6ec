// Error types for the feed client

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// A feed payload that could not be turned into a [`FeedMessage`](crate::net::FeedMessage).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload is not JSON, or a record has the wrong shape
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is valid JSON but not an object
    #[error("payload is a JSON {found}, expected an object")]
    NotAnObject { found: &'static str },

    /// A known message kind arrived without the field it depends on
    #[error("'{kind}' message is missing the '{field}' field")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    /// Binary frame whose body is not UTF-8
    #[error("binary frame is not valid UTF-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

/// Errors raised by the feed transport.
#[derive(Debug, Error)]
pub enum FeedError {
    /// WebSocket handshake or socket failure
    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    /// Malformed inbound message
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Invalid command-line configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Endpoint scheme cannot carry a push connection
    #[error("unsupported feed URL '{url}': expected ws://, wss://, http:// or https://")]
    UnsupportedScheme { url: String },

    /// Backoff settings that would never produce a delay
    #[error("invalid backoff: {reason}")]
    InvalidBackoff { reason: String },
}
