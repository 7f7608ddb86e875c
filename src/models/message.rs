use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::deserialize_nullable_timestamp;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation.
///
/// Messages are immutable once created; the transcript only ever appends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Client-generated for local turns, server-issued for loaded history
    pub id: String,
    /// Role of the message sender
    pub role: MessageRole,
    /// Full text of the turn
    pub content: String,
    /// When the message was created (server sends as "timestamp" or "createdAt")
    #[serde(
        default = "Utc::now",
        alias = "timestamp",
        alias = "createdAt",
        deserialize_with = "deserialize_nullable_timestamp"
    )]
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped now with a fresh id.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let user = Message::user("hello");
        assert!(user.is_user());
        assert_eq!(user.content, "hello");

        let assistant = Message::assistant("hi there");
        assert!(assistant.is_assistant());
        assert_ne!(user.id, assistant.id);
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
        let role: MessageRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, MessageRole::User);
        assert_eq!(MessageRole::User.as_str(), "user");
    }

    #[test]
    fn test_deserialize_server_message_without_timestamp() {
        let json = r#"{"id":"m1","role":"assistant","content":"Answer"}"#;
        let before = Utc::now();
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.id, "m1");
        assert_eq!(message.role, MessageRole::Assistant);
        assert!(message.created_at >= before);
    }

    #[test]
    fn test_deserialize_server_message_with_timestamp_alias() {
        let json = r#"{"id":"m2","role":"user","content":"Q","timestamp":"2026-01-05T10:00:00Z"}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.created_at.to_rfc3339(), "2026-01-05T10:00:00+00:00");
    }
}
