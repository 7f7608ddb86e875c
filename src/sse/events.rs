//! Protocol event types
//!
//! Contains the ProtocolEvent enum with every event the streaming endpoint
//! emits, and the per-line parse error.

use serde::{Deserialize, Serialize};

/// Typed events from the chat streaming endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProtocolEvent {
    /// Incremental text to append to the reply
    Chunk { text: String },
    /// Server-declared clean end, optionally carrying a final piece of text
    Complete {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Server-declared failure
    Error { message: String },
}

impl ProtocolEvent {
    /// Returns the event type name as a string for logging.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            ProtocolEvent::Chunk { .. } => "chunk",
            ProtocolEvent::Complete { .. } => "complete",
            ProtocolEvent::Error { .. } => "error",
        }
    }

    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProtocolEvent::Complete { .. } | ProtocolEvent::Error { .. }
        )
    }
}

/// Failure to turn one candidate line into an event.
///
/// Always scoped to a single line; the stream keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseParseError {
    /// Payload was not valid JSON
    InvalidJson { source: String },
    /// Payload was JSON but not an object with a string `type`
    MissingType,
    /// `type` was not one of the known event kinds
    UnknownEventType(String),
    /// A field the event type requires was absent or had the wrong shape
    MissingField {
        event_type: String,
        field: &'static str,
    },
}

impl std::fmt::Display for SseParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SseParseError::InvalidJson { source } => write!(f, "Invalid JSON payload: {}", source),
            SseParseError::MissingType => write!(f, "Payload has no string 'type' field"),
            SseParseError::UnknownEventType(t) => write!(f, "Unknown event type: {}", t),
            SseParseError::MissingField { event_type, field } => {
                write!(f, "Event '{}' is missing field '{}'", event_type, field)
            }
        }
    }
}

impl std::error::Error for SseParseError {}
