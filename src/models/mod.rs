//! Data model: messages, conversations and listings.

mod conversation;
mod message;

pub use conversation::{title_hint, Conversation, ConversationSummary};
pub use message::{Message, MessageRole};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Helper to deserialize a timestamp that the server may send as null.
/// Null falls back to "now", matching a missing field.
pub(crate) fn deserialize_nullable_timestamp<'de, D>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_else(Utc::now))
}
