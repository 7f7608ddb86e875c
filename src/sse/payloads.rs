//! Raw data payloads for each event type.
//!
//! The `type` tag is read separately by the parser, so these only describe
//! the remaining fields. Unknown extra fields are ignored.

use serde::Deserialize;

/// `{"type":"chunk","text":"..."}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChunkPayload {
    pub text: String,
}

/// `{"type":"complete","text":"..."}` with `text` optional or null
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CompletePayload {
    #[serde(default)]
    pub text: Option<String>,
}

/// `{"type":"error","message":"..."}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorPayload {
    pub message: String,
}
