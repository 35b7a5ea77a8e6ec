// Feed message definitions
// Inbound JSON objects tagged by a "type" field

use serde::Deserialize;
use serde_json::Value;

use crate::aircraft::Aircraft;
use crate::error::DecodeError;

/// Envelope as it arrives on the wire: `{type, aircraft?, id?}`.
///
/// Payload fields stay untyped until the kind is known, so an unrecognised
/// kind never fails on fields it does not use.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    aircraft: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
}

/// Messages pushed by the tracking backend
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// Full picture sent right after the connection opens
    InitialData(Vec<Aircraft>),
    /// Changed aircraft since the last message
    AircraftUpdate(Vec<Aircraft>),
    /// An aircraft left the feed
    AircraftRemoved(String),
    /// Backend is going away; all aircraft are stale
    ServerShutdown,
    /// Any other discriminator, kept for diagnostics
    Unknown(String),
}

impl FeedMessage {
    /// Decode a text payload
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        // Derived struct decoding also takes arrays by position; only objects are messages
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(DecodeError::NotAnObject {
                found: json_kind(&value),
            });
        }
        let envelope: Envelope = serde_json::from_value(value)?;
        Self::from_envelope(envelope)
    }

    fn from_envelope(envelope: Envelope) -> Result<Self, DecodeError> {
        match envelope.kind.as_str() {
            "initial_data" => Ok(FeedMessage::InitialData(aircraft_list(
                "initial_data",
                envelope.aircraft,
            )?)),
            "aircraft_update" => Ok(FeedMessage::AircraftUpdate(aircraft_list(
                "aircraft_update",
                envelope.aircraft,
            )?)),
            "aircraft_removed" => {
                let id = envelope.id.ok_or(DecodeError::MissingField {
                    kind: "aircraft_removed",
                    field: "id",
                })?;
                Ok(FeedMessage::AircraftRemoved(serde_json::from_value(id)?))
            }
            "server_shutdown" => Ok(FeedMessage::ServerShutdown),
            _ => Ok(FeedMessage::Unknown(envelope.kind)),
        }
    }

    /// Wire name of this message kind
    pub fn kind(&self) -> &str {
        match self {
            FeedMessage::InitialData(_) => "initial_data",
            FeedMessage::AircraftUpdate(_) => "aircraft_update",
            FeedMessage::AircraftRemoved(_) => "aircraft_removed",
            FeedMessage::ServerShutdown => "server_shutdown",
            FeedMessage::Unknown(kind) => kind,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn aircraft_list(kind: &'static str, value: Option<Value>) -> Result<Vec<Aircraft>, DecodeError> {
    let value = value.ok_or(DecodeError::MissingField {
        kind,
        field: "aircraft",
    })?;
    Ok(serde_json::from_value(value)?)
}
