//! Incremental UTF-8 decoding of a byte stream.
//!
//! Transport chunks are cut at arbitrary byte offsets, so a multi-byte
//! character can arrive split across two chunks. The decoder keeps the
//! incomplete tail of one chunk and prefixes it to the next.

use std::char::REPLACEMENT_CHARACTER;

/// Stateful UTF-8 decoder for chunked input.
///
/// Malformed sequences decode to U+FFFD instead of failing, so encoding
/// noise never aborts the text stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Utf8ChunkDecoder {
    /// Bytes of a character whose remaining bytes have not arrived yet
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    /// Create a decoder with no carried-over bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, prefixed with any bytes held from the last call.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(chunk);

        let mut out = String::with_capacity(input.len());
        let mut rest: &[u8] = &input;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // `valid` is well-formed by construction, lossy never substitutes here
                    out.push_str(&String::from_utf8_lossy(valid));

                    match e.error_len() {
                        Some(bad) => {
                            out.push(REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush at end of input. A dangling partial character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            REPLACEMENT_CHARACTER.to_string()
        }
    }

    /// Number of bytes currently held for the next chunk.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ascii() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(b"hello"), "hello");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_decode_split_two_byte_char() {
        // "é" is 0xC3 0xA9
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(&[b'c', b'a', b'f', 0xC3]), "caf");
        assert_eq!(decoder.pending_len(), 1);
        assert_eq!(decoder.decode(&[0xA9, b'!']), "é!");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_decode_four_byte_char_one_byte_at_a_time() {
        let bytes = "🚀".as_bytes();
        let mut decoder = Utf8ChunkDecoder::new();
        let mut out = String::new();
        for b in bytes {
            out.push_str(&decoder.decode(&[*b]));
        }
        assert_eq!(out, "🚀");
    }

    #[test]
    fn test_decode_invalid_byte_replaced() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_decode_invalid_continuation_replaced() {
        // Lead byte of a 2-byte sequence followed by ASCII
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(&[0xC3, b'x']), "\u{FFFD}x");
    }

    #[test]
    fn test_finish_flushes_dangling_bytes() {
        let mut decoder = Utf8ChunkDecoder::new();
        assert_eq!(decoder.decode(&[0xE2, 0x82]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.pending_len(), 0);
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_empty_chunk_keeps_pending() {
        let mut decoder = Utf8ChunkDecoder::new();
        decoder.decode(&[0xF0, 0x9F]);
        assert_eq!(decoder.decode(&[]), "");
        assert_eq!(decoder.pending_len(), 2);
        assert_eq!(decoder.decode(&[0x9A, 0x80]), "🚀");
    }
}
