//! In-memory history store for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::models::{ConversationSummary, Message};
use crate::traits::{HistoryError, HistoryStore};

#[derive(Debug, Default)]
struct StoreState {
    conversations: BTreeMap<String, (ConversationSummary, Vec<Message>)>,
    next_id: u64,
    create_calls: usize,
    failing_creates: usize,
    create_delay: Option<Duration>,
}

/// History store kept entirely in memory.
///
/// Creation can be scripted to fail or to take a while, and every create
/// call is counted so tests can assert create-once behaviour.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` create calls fail.
    pub fn fail_next_creates(&self, count: usize) {
        self.state.lock().unwrap().failing_creates = count;
    }

    /// Delay every create call.
    pub fn set_create_delay(&self, delay: Duration) {
        self.state.lock().unwrap().create_delay = Some(delay);
    }

    /// Number of create calls received, failed ones included.
    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    /// Number of conversations currently stored.
    pub fn conversation_count(&self) -> usize {
        self.state.lock().unwrap().conversations.len()
    }

    /// Seed a conversation with a transcript.
    pub fn insert_conversation(&self, id: &str, title: &str, messages: Vec<Message>) {
        let now = Utc::now();
        let summary = ConversationSummary {
            id: id.to_string(),
            title: Some(title.to_string()),
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .conversations
            .insert(id.to_string(), (summary, messages));
    }

    /// Append to a stored transcript, the way the backend records streamed turns.
    pub fn append_message(&self, id: &str, message: Message) {
        if let Some((summary, messages)) = self.state.lock().unwrap().conversations.get_mut(id) {
            summary.updated_at = Utc::now();
            messages.push(message);
        }
    }

    /// Title recorded for a conversation.
    pub fn title_of(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .conversations
            .get(id)
            .and_then(|(summary, _)| summary.title.clone())
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn create_conversation(&self, title_hint: &str) -> Result<String, HistoryError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.create_calls += 1;
            state.create_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if state.failing_creates > 0 {
            state.failing_creates -= 1;
            return Err(HistoryError::Transport("scripted failure".to_string()));
        }

        state.next_id += 1;
        let id = format!("chat-{}", state.next_id);
        let now = Utc::now();
        let summary = ConversationSummary {
            id: id.clone(),
            title: Some(title_hint.to_string()),
            created_at: now,
            updated_at: now,
        };
        state
            .conversations
            .insert(id.clone(), (summary, Vec::new()));
        Ok(id)
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, HistoryError> {
        let state = self.state.lock().unwrap();
        let mut summaries: Vec<_> = state
            .conversations
            .values()
            .map(|(summary, _)| summary.clone())
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, HistoryError> {
        let state = self.state.lock().unwrap();
        state
            .conversations
            .get(conversation_id)
            .map(|(_, messages)| messages.clone())
            .ok_or_else(|| HistoryError::NotFound(conversation_id.to_string()))
    }

    async fn rename_conversation(
        &self,
        conversation_id: &str,
        title: &str,
    ) -> Result<ConversationSummary, HistoryError> {
        let mut state = self.state.lock().unwrap();
        let (summary, _) = state
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| HistoryError::NotFound(conversation_id.to_string()))?;
        summary.title = Some(title.to_string());
        summary.updated_at = Utc::now();
        Ok(summary.clone())
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), HistoryError> {
        let mut state = self.state.lock().unwrap();
        state
            .conversations
            .remove(conversation_id)
            .map(|_| ())
            .ok_or_else(|| HistoryError::NotFound(conversation_id.to_string()))
    }

    async fn delete_all_conversations(&self) -> Result<(), HistoryError> {
        self.state.lock().unwrap().conversations.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list() {
        let store = InMemoryHistoryStore::new();
        let id = store.create_conversation("Hello").await.unwrap();
        assert_eq!(id, "chat-1");
        assert_eq!(store.create_calls(), 1);

        let list = store.list_conversations().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn test_scripted_create_failure() {
        let store = InMemoryHistoryStore::new();
        store.fail_next_creates(1);
        assert!(store.create_conversation("x").await.is_err());
        assert!(store.create_conversation("x").await.is_ok());
        assert_eq!(store.create_calls(), 2);
        assert_eq!(store.conversation_count(), 1);
    }

    #[tokio::test]
    async fn test_messages_rename_delete() {
        let store = InMemoryHistoryStore::new();
        store.insert_conversation("c1", "Old", vec![Message::user("q")]);
        store.append_message("c1", Message::assistant("a"));

        assert_eq!(store.get_messages("c1").await.unwrap().len(), 2);
        assert!(matches!(
            store.get_messages("missing").await,
            Err(HistoryError::NotFound(_))
        ));

        store.rename_conversation("c1", "New").await.unwrap();
        assert_eq!(store.title_of("c1").as_deref(), Some("New"));

        store.delete_conversation("c1").await.unwrap();
        assert!(store.delete_conversation("c1").await.is_err());

        store.insert_conversation("c2", "t", Vec::new());
        store.delete_all_conversations().await.unwrap();
        assert_eq!(store.conversation_count(), 0);
    }
}
