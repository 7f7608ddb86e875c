//! History store trait abstraction.
//!
//! The history store owns persisted conversations. The session controller
//! only needs it to create a conversation identity and to read transcripts;
//! streamed replies are persisted by the backend itself.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ConversationSummary, Message};

/// History store operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// Transport to the store failed
    #[error("History store unreachable: {0}")]
    Transport(String),
    /// The store answered with errors
    #[error("History store rejected request: {0}")]
    Rejected(String),
    /// The answer did not have the expected shape
    #[error("Unexpected history store response: {0}")]
    InvalidResponse(String),
    /// The conversation does not exist
    #[error("Conversation not found: {0}")]
    NotFound(String),
}

/// Trait for the persisted conversation store.
///
/// Implementations include the GraphQL-backed production store and an
/// in-memory store for tests.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Create a conversation and return its server-issued identity.
    async fn create_conversation(&self, title_hint: &str) -> Result<String, HistoryError>;

    /// List the caller's conversations.
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, HistoryError>;

    /// Fetch the transcript of one conversation, oldest first.
    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, HistoryError>;

    /// Change a conversation's title.
    async fn rename_conversation(
        &self,
        conversation_id: &str,
        title: &str,
    ) -> Result<ConversationSummary, HistoryError>;

    /// Delete one conversation.
    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), HistoryError>;

    /// Delete every conversation of the caller.
    async fn delete_all_conversations(&self) -> Result<(), HistoryError>;
}
