use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::deserialize_nullable_timestamp;
use super::message::Message;

/// Conversation as listed by the history store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// Server-issued identity
    pub id: String,
    /// Title (the first characters of the opening prompt unless renamed)
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_nullable_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_nullable_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl ConversationSummary {
    /// Title to show, falling back to a placeholder for untitled chats
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => "Untitled chat",
        }
    }
}

/// A conversation as held by the client: identity plus append-only transcript.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    /// Absent until the history store has created the conversation
    id: Option<String>,
    messages: Vec<Message>,
}

impl Conversation {
    /// A brand-new conversation with no identity yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// An existing conversation, optionally seeded with loaded history.
    pub fn existing(id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            id: Some(id.into()),
            messages,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn has_identity(&self) -> bool {
        self.id.is_some()
    }

    /// Record the server-issued identity. Returns false if one was already set.
    pub fn assign_identity(&mut self, id: impl Into<String>) -> bool {
        if self.id.is_some() {
            return false;
        }
        self.id = Some(id.into());
        true
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Replace the transcript with a fresh copy from the history store.
    pub fn replace_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }
}

/// Title hint for a new conversation: the first `max_chars` characters of the prompt.
pub fn title_hint(prompt: &str, max_chars: usize) -> String {
    prompt.trim().chars().take(max_chars).collect()
}
