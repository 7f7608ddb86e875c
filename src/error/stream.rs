//! Streaming-related error types.
//!
//! Errors that occur while reading the chat event stream. None of these
//! reach the transcript directly; the consumer folds them into an outcome.

use std::fmt;

use crate::sse::SseParseError;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Invalid JSON in a data line.
    InvalidJson { message: String },

    /// Payload lacked a usable `type` discriminator.
    MissingType,

    /// Unknown event type received.
    UnknownEventType { event_type: String },

    /// Known event type without a field it requires.
    MissingField { event_type: String, field: String },

    /// The server sent an `error` event.
    BackendError { message: String },

    /// The stream ended without delivering any text.
    NoContent,

    /// The connection dropped while reading.
    ConnectionLost { message: String },
}

impl StreamError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::BackendError { .. }
                | StreamError::NoContent
                | StreamError::ConnectionLost { .. }
        )
    }

    /// True for errors scoped to a single line of the stream.
    pub fn is_line_local(&self) -> bool {
        matches!(
            self,
            StreamError::InvalidJson { .. }
                | StreamError::MissingType
                | StreamError::UnknownEventType { .. }
                | StreamError::MissingField { .. }
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::BackendError { .. } => {
                "The assistant could not finish the reply. Please try again.".to_string()
            }
            StreamError::NoContent => "The assistant sent an empty reply.".to_string(),
            StreamError::ConnectionLost { .. } => {
                "The connection was lost while receiving the reply.".to_string()
            }
            _ => "Received malformed data from the server.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::InvalidJson { .. } => "E_STREAM_JSON",
            StreamError::MissingType => "E_STREAM_TYPE",
            StreamError::UnknownEventType { .. } => "E_STREAM_UNKNOWN",
            StreamError::MissingField { .. } => "E_STREAM_FIELD",
            StreamError::BackendError { .. } => "E_STREAM_BACKEND",
            StreamError::NoContent => "E_STREAM_EMPTY",
            StreamError::ConnectionLost { .. } => "E_STREAM_LOST",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::InvalidJson { message } => write!(f, "Invalid JSON: {}", message),
            StreamError::MissingType => write!(f, "Event has no type"),
            StreamError::UnknownEventType { event_type } => {
                write!(f, "Unknown event type: {}", event_type)
            }
            StreamError::MissingField { event_type, field } => {
                write!(f, "Event '{}' is missing field '{}'", event_type, field)
            }
            StreamError::BackendError { message } => write!(f, "Backend error: {}", message),
            StreamError::NoContent => write!(f, "no content received"),
            StreamError::ConnectionLost { message } => write!(f, "Connection lost: {}", message),
        }
    }
}

impl std::error::Error for StreamError {}

impl From<SseParseError> for StreamError {
    fn from(err: SseParseError) -> Self {
        match err {
            SseParseError::InvalidJson { source } => StreamError::InvalidJson { message: source },
            SseParseError::MissingType => StreamError::MissingType,
            SseParseError::UnknownEventType(event_type) => {
                StreamError::UnknownEventType { event_type }
            }
            SseParseError::MissingField { event_type, field } => StreamError::MissingField {
                event_type,
                field: field.to_string(),
            },
        }
    }
}
