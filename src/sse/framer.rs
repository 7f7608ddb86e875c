//! Newline framing over decoded text.

/// Result of framing one piece of decoded text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Framed {
    /// Complete lines, without their terminators, in arrival order
    pub lines: Vec<String>,
    /// Unterminated tail to carry into the next call
    pub residue: String,
}

/// Split `carried + decoded` into complete lines plus the trailing fragment.
///
/// A line is only emitted once its `\n` has been seen. A `\r` directly before
/// the `\n` is stripped so CRLF streams frame the same as LF streams.
pub fn frame_lines(carried: String, decoded: &str) -> Framed {
    let mut buffer = carried;
    buffer.push_str(decoded);

    let Some(last_newline) = buffer.rfind('\n') else {
        return Framed {
            lines: Vec::new(),
            residue: buffer,
        };
    };

    let residue = buffer[last_newline + 1..].to_string();
    buffer.truncate(last_newline);

    let lines = buffer
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();

    Framed { lines, residue }
}

/// Line framer that owns its residue between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFramer {
    residue: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed decoded text, returning the lines it completed.
    pub fn push(&mut self, decoded: &str) -> Vec<String> {
        let framed = frame_lines(std::mem::take(&mut self.residue), decoded);
        self.residue = framed.residue;
        framed.lines
    }

    /// Drop the residue at end of stream, returning what was discarded.
    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.residue)
    }
}
