//! Event-stream decoding for the chat streaming endpoint.
//!
//! Bytes flow through three stages:
//! - [`decoder`]: bytes to text, holding split multi-byte characters
//! - [`framer`]: text to complete lines, holding the unterminated tail
//! - [`parser`]: `data: <json>` lines to [`ProtocolEvent`]s
//!
//! [`EventDecoder`] chains them for one stream.

pub mod decoder;
pub mod events;
pub mod framer;
pub mod parser;
mod payloads;

pub use decoder::Utf8ChunkDecoder;
pub use events::{ProtocolEvent, SseParseError};
pub use framer::{frame_lines, Framed, LineFramer};
pub use parser::{parse_event_line, parse_event_payload, parse_sse_line, SseLine, DATA_PREFIX};

use crate::error::StreamError;

/// Decoder state for one stream: bytes in, events out.
///
/// Per-line parse failures are logged and dropped here so a noisy line never
/// reaches the caller.
#[derive(Debug, Clone, Default)]
pub struct EventDecoder {
    decoder: Utf8ChunkDecoder,
    framer: LineFramer,
    dropped_lines: usize,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk and return the events it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ProtocolEvent> {
        let text = self.decoder.decode(chunk);
        let lines = self.framer.push(&text);

        let mut events = Vec::new();
        for line in lines {
            match parse_event_line(&line) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => {
                    self.dropped_lines += 1;
                    let err = StreamError::from(e);
                    tracing::warn!(
                        "Dropping unparseable stream line [{}]: {} ({:?})",
                        err.error_code(),
                        err,
                        line
                    );
                }
            }
        }
        events
    }

    /// End of input: discard whatever unterminated fragment is left.
    pub fn finish(&mut self) {
        let tail = self.decoder.finish();
        let mut residue = self.framer.finish();
        residue.push_str(&tail);
        if !residue.is_empty() {
            tracing::debug!(
                "Discarding {} bytes of unterminated stream data",
                residue.len()
            );
        }
    }

    /// Count of candidate lines dropped as unparseable so far.
    pub fn dropped_lines(&self) -> usize {
        self.dropped_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_split_mid_stream_yields_one_event() {
        let mut events = EventDecoder::new();
        assert!(events.push(b"data: {\"type\":\"chu").is_empty());
        let out = events.push(b"nk\",\"text\":\"hi\"}\n");
        assert_eq!(
            out,
            vec![ProtocolEvent::Chunk {
                text: "hi".to_string()
            }]
        );
        assert_eq!(events.dropped_lines(), 0);
    }

    #[test]
    fn test_multibyte_char_split_inside_json() {
        let line = "data: {\"type\":\"chunk\",\"text\":\"żółw\"}\n".as_bytes();
        // Split inside the two-byte 'ż'
        let split = line.iter().position(|b| *b == 0xC5).unwrap() + 1;
        let mut events = EventDecoder::new();
        assert!(events.push(&line[..split]).is_empty());
        assert_eq!(
            events.push(&line[split..]),
            vec![ProtocolEvent::Chunk {
                text: "żółw".to_string()
            }]
        );
    }

    #[test]
    fn test_several_events_in_one_chunk() {
        let mut events = EventDecoder::new();
        let out = events.push(
            b"data: {\"type\":\"chunk\",\"text\":\"a\"}\n\n: ping\ndata: {\"type\":\"complete\"}\n",
        );
        assert_eq!(
            out,
            vec![
                ProtocolEvent::Chunk {
                    text: "a".to_string()
                },
                ProtocolEvent::Complete { text: None },
            ]
        );
    }

    #[test]
    fn test_bad_line_is_dropped_and_counted() {
        let mut events = EventDecoder::new();
        let out = events.push(b"data: {oops\ndata: {\"type\":\"chunk\",\"text\":\"ok\"}\n");
        assert_eq!(
            out,
            vec![ProtocolEvent::Chunk {
                text: "ok".to_string()
            }]
        );
        assert_eq!(events.dropped_lines(), 1);
    }

    #[test]
    fn test_finish_discards_unterminated_event() {
        let mut events = EventDecoder::new();
        assert!(events
            .push(b"data: {\"type\":\"chunk\",\"text\":\"never\"}")
            .is_empty());
        events.finish();
        assert!(events.push(b"\n").is_empty());
        assert_eq!(events.dropped_lines(), 0);
    }
}
