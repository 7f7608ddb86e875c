//! Line classification and event parsing.
//!
//! A framed line is only a candidate event when it carries the `data:`
//! prefix; the remainder is JSON classified by its `type` field.

use serde::de::DeserializeOwned;

use crate::sse::events::{ProtocolEvent, SseParseError};
use crate::sse::payloads::{ChunkPayload, CompletePayload, ErrorPayload};

/// Framing prefix of event lines.
pub const DATA_PREFIX: &str = "data:";

/// Represents a classified line from the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Data payload, prefix removed and trimmed
    Data(String),
    /// Empty line (keep-alive or event separator)
    Empty,
    /// Comment line (starts with ':')
    Comment(String),
    /// Anything else; ignored
    Other(String),
}

/// Classify a single framed line.
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.trim().is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
        return SseLine::Data(rest.trim().to_string());
    }

    SseLine::Other(line.to_string())
}

/// Parse one framed line into an event.
///
/// Returns `Ok(None)` for lines that are not events at all, and an error for
/// candidate lines whose payload cannot be classified.
pub fn parse_event_line(line: &str) -> Result<Option<ProtocolEvent>, SseParseError> {
    match parse_sse_line(line) {
        SseLine::Data(payload) if payload.is_empty() => Ok(None),
        SseLine::Data(payload) => parse_event_payload(&payload).map(Some),
        SseLine::Empty | SseLine::Comment(_) | SseLine::Other(_) => Ok(None),
    }
}

/// Classify a JSON payload by its `type` field.
pub fn parse_event_payload(data: &str) -> Result<ProtocolEvent, SseParseError> {
    let value: serde_json::Value =
        serde_json::from_str(data).map_err(|e| SseParseError::InvalidJson {
            source: e.to_string(),
        })?;

    let event_type = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or(SseParseError::MissingType)?
        .to_string();

    match event_type.as_str() {
        "chunk" => {
            let payload: ChunkPayload = payload_from(value, &event_type, "text")?;
            Ok(ProtocolEvent::Chunk { text: payload.text })
        }
        "complete" => {
            let payload: CompletePayload = payload_from(value, &event_type, "text")?;
            Ok(ProtocolEvent::Complete { text: payload.text })
        }
        "error" => {
            let payload: ErrorPayload = payload_from(value, &event_type, "message")?;
            Ok(ProtocolEvent::Error {
                message: payload.message,
            })
        }
        _ => Err(SseParseError::UnknownEventType(event_type)),
    }
}

fn payload_from<T: DeserializeOwned>(
    value: serde_json::Value,
    event_type: &str,
    field: &'static str,
) -> Result<T, SseParseError> {
    serde_json::from_value(value).map_err(|_| SseParseError::MissingField {
        event_type: event_type.to_string(),
        field,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_line_variants() {
        assert_eq!(parse_sse_line(""), SseLine::Empty);
        assert_eq!(parse_sse_line("   "), SseLine::Empty);
        assert_eq!(
            parse_sse_line(": keep-alive"),
            SseLine::Comment("keep-alive".to_string())
        );
        assert_eq!(
            parse_sse_line("data: {\"a\":1}  "),
            SseLine::Data("{\"a\":1}".to_string())
        );
        assert_eq!(
            parse_sse_line("event: chunk"),
            SseLine::Other("event: chunk".to_string())
        );
    }

    #[test]
    fn test_parse_chunk_event() {
        let event = parse_event_line(r#"data: {"type":"chunk","text":"Hello"}"#).unwrap();
        assert_eq!(
            event,
            Some(ProtocolEvent::Chunk {
                text: "Hello".to_string()
            })
        );
    }

    #[test]
    fn test_parse_chunk_without_space_after_prefix() {
        let event = parse_event_line(r#"data:{"type":"chunk","text":"x"}"#).unwrap();
        assert_eq!(
            event,
            Some(ProtocolEvent::Chunk {
                text: "x".to_string()
            })
        );
    }

    #[test]
    fn test_parse_chunk_with_extra_fields() {
        let event =
            parse_event_line(r#"data: {"type":"chunk","text":"Hi","seq":4,"model":"m"}"#).unwrap();
        assert_eq!(
            event,
            Some(ProtocolEvent::Chunk {
                text: "Hi".to_string()
            })
        );
    }

    #[test]
    fn test_parse_complete_with_and_without_text() {
        assert_eq!(
            parse_event_line(r#"data: {"type":"complete","text":"!"}"#).unwrap(),
            Some(ProtocolEvent::Complete {
                text: Some("!".to_string())
            })
        );
        assert_eq!(
            parse_event_line(r#"data: {"type":"complete"}"#).unwrap(),
            Some(ProtocolEvent::Complete { text: None })
        );
        assert_eq!(
            parse_event_line(r#"data: {"type":"complete","text":null}"#).unwrap(),
            Some(ProtocolEvent::Complete { text: None })
        );
    }

    #[test]
    fn test_parse_error_event() {
        assert_eq!(
            parse_event_line(r#"data: {"type":"error","message":"model overloaded"}"#).unwrap(),
            Some(ProtocolEvent::Error {
                message: "model overloaded".to_string()
            })
        );
    }

    #[test]
    fn test_non_event_lines_are_ignored() {
        assert_eq!(parse_event_line("").unwrap(), None);
        assert_eq!(parse_event_line(": ping").unwrap(), None);
        assert_eq!(parse_event_line("event: chunk").unwrap(), None);
        assert_eq!(parse_event_line("data:").unwrap(), None);
        assert_eq!(parse_event_line("data:    ").unwrap(), None);
    }

    #[test]
    fn test_malformed_json_is_line_error() {
        let err = parse_event_line(r#"data: {"type":"chu"#).unwrap_err();
        assert!(matches!(err, SseParseError::InvalidJson { .. }));
    }

    #[test]
    fn test_unknown_type_is_line_error() {
        assert_eq!(
            parse_event_line(r#"data: {"type":"ping"}"#).unwrap_err(),
            SseParseError::UnknownEventType("ping".to_string())
        );
    }

    #[test]
    fn test_missing_type_is_line_error() {
        assert_eq!(
            parse_event_line(r#"data: {"text":"orphan"}"#).unwrap_err(),
            SseParseError::MissingType
        );
        assert_eq!(
            parse_event_line(r#"data: [1,2,3]"#).unwrap_err(),
            SseParseError::MissingType
        );
    }

    #[test]
    fn test_missing_required_field_is_line_error() {
        assert_eq!(
            parse_event_line(r#"data: {"type":"chunk"}"#).unwrap_err(),
            SseParseError::MissingField {
                event_type: "chunk".to_string(),
                field: "text"
            }
        );
        assert_eq!(
            parse_event_line(r#"data: {"type":"error"}"#).unwrap_err(),
            SseParseError::MissingField {
                event_type: "error".to_string(),
                field: "message"
            }
        );
        assert!(parse_event_line(r#"data: {"type":"chunk","text":5}"#).is_err());
    }
}
