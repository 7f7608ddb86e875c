//! GraphQL-backed history store.
//!
//! Talks to the backend's GraphQL endpoint over any [`HttpClient`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::models::{ConversationSummary, Message};
use crate::traits::{HistoryError, HistoryStore, HttpClient};

pub const CREATE_CHAT: &str = "mutation CreateMateChat($title: String) { create_mate_chat(input: { title: $title }) { id title createdAt updatedAt } }";

pub const LIST_CHATS: &str = "query Get_mate_chats { get_mate_chats(input: { page: null, limit: null }) { items { id title createdAt updatedAt } pageInfo { limit page totalCount hasNext hasPrevious } } }";

pub const GET_MESSAGES: &str = "query GetMateMessages($input: GetMateMessagesInput!) { get_mate_messages(input: $input) { items { id role content } hasMore } }";

pub const RENAME_CHAT: &str = "mutation Update_mate_chat_title($chatId: String!, $title: String!) { update_mate_chat_title(input: { chatId: $chatId, title: $title }) { id title createdAt updatedAt } }";

pub const DELETE_CHAT: &str =
    "mutation Delete_mate_chat($chatId: String!) { delete_mate_chat(chatId: $chatId) }";

pub const DELETE_ALL_CHATS: &str = "mutation Delete_all_mate_chats { delete_all_mate_chats }";

/// Standard GraphQL response envelope
#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CreatedChat {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateChatData {
    create_mate_chat: Option<CreatedChat>,
}

#[derive(Debug, Deserialize)]
struct ItemsPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ListChatsData {
    get_mate_chats: ItemsPage<ConversationSummary>,
}

#[derive(Debug, Deserialize)]
struct GetMessagesData {
    get_mate_messages: ItemsPage<Message>,
}

#[derive(Debug, Deserialize)]
struct RenameChatData {
    update_mate_chat_title: Option<ConversationSummary>,
}

#[derive(Debug, Deserialize)]
struct DeleteChatData {
    delete_mate_chat: bool,
}

#[derive(Debug, Deserialize)]
struct DeleteAllChatsData {
    #[allow(dead_code)]
    delete_all_mate_chats: serde_json::Value,
}

/// History store speaking the backend's GraphQL schema.
pub struct GraphqlHistoryStore {
    client: Arc<dyn HttpClient>,
    config: ClientConfig,
}

impl GraphqlHistoryStore {
    pub fn new(client: Arc<dyn HttpClient>, config: ClientConfig) -> Self {
        Self { client, config }
    }

    /// Run one GraphQL operation and return its `data`.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, HistoryError> {
        let body = json!({ "query": query, "variables": variables }).to_string();
        let response = self
            .client
            .post(
                &self.config.graphql_endpoint(),
                &body,
                &self.config.graphql_headers(),
            )
            .await
            .map_err(|e| HistoryError::Transport(e.to_string()))?;

        if !response.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(HistoryError::Rejected(format!(
                "HTTP {}: {}",
                response.status,
                detail.trim()
            )));
        }

        let envelope: GraphqlResponse<T> = response
            .json()
            .map_err(|e| HistoryError::InvalidResponse(e.to_string()))?;

        if !envelope.errors.is_empty() {
            let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
            return Err(HistoryError::Rejected(messages.join("; ")));
        }

        envelope
            .data
            .ok_or_else(|| HistoryError::InvalidResponse("response has no data".to_string()))
    }
}

#[async_trait]
impl HistoryStore for GraphqlHistoryStore {
    async fn create_conversation(&self, title_hint: &str) -> Result<String, HistoryError> {
        let data: CreateChatData = self
            .execute(CREATE_CHAT, json!({ "title": title_hint }))
            .await?;

        data.create_mate_chat
            .and_then(|chat| chat.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                HistoryError::InvalidResponse("create_mate_chat returned no id".to_string())
            })
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, HistoryError> {
        let data: ListChatsData = self.execute(LIST_CHATS, json!({})).await?;
        Ok(data.get_mate_chats.items)
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, HistoryError> {
        let data: GetMessagesData = self
            .execute(
                GET_MESSAGES,
                json!({ "input": { "chatId": conversation_id } }),
            )
            .await?;
        Ok(data.get_mate_messages.items)
    }

    async fn rename_conversation(
        &self,
        conversation_id: &str,
        title: &str,
    ) -> Result<ConversationSummary, HistoryError> {
        let data: RenameChatData = self
            .execute(
                RENAME_CHAT,
                json!({ "chatId": conversation_id, "title": title }),
            )
            .await?;
        data.update_mate_chat_title
            .ok_or_else(|| HistoryError::NotFound(conversation_id.to_string()))
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), HistoryError> {
        let data: DeleteChatData = self
            .execute(DELETE_CHAT, json!({ "chatId": conversation_id }))
            .await?;
        if data.delete_mate_chat {
            Ok(())
        } else {
            Err(HistoryError::NotFound(conversation_id.to_string()))
        }
    }

    async fn delete_all_conversations(&self) -> Result<(), HistoryError> {
        let _: DeleteAllChatsData = self.execute(DELETE_ALL_CHATS, json!({})).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use crate::traits::{HttpError, Response};
    use bytes::Bytes;

    const ENDPOINT: &str = "http://history.test/graphql";

    fn store_with(body: &str) -> (GraphqlHistoryStore, MockHttpClient) {
        let client = MockHttpClient::new();
        client.set_response(
            ENDPOINT,
            MockResponse::Success(Response::new(200, Bytes::from(body.to_string()))),
        );
        let config = ClientConfig::new()
            .with_graphql_url(ENDPOINT)
            .with_token("tok");
        (
            GraphqlHistoryStore::new(Arc::new(client.clone()), config),
            client,
        )
    }

    #[tokio::test]
    async fn test_create_conversation_returns_id() {
        let (store, client) = store_with(
            r#"{"data":{"create_mate_chat":{"id":"chat-42","title":"Hello","createdAt":null,"updatedAt":null}}}"#,
        );
        let id = store.create_conversation("Hello").await.unwrap();
        assert_eq!(id, "chat-42");

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].headers.get("Authorization").unwrap(), "Bearer tok");
        let sent: serde_json::Value =
            serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["variables"]["title"], "Hello");
    }

    #[tokio::test]
    async fn test_create_conversation_without_id_fails() {
        let (store, _) = store_with(r#"{"data":{"create_mate_chat":null}}"#);
        let err = store.create_conversation("x").await.unwrap_err();
        assert!(matches!(err, HistoryError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_graphql_errors_are_rejections() {
        let (store, _) = store_with(
            r#"{"data":null,"errors":[{"message":"Unauthorized"},{"message":"again"}]}"#,
        );
        let err = store.list_conversations().await.unwrap_err();
        assert_eq!(err, HistoryError::Rejected("Unauthorized; again".to_string()));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Error(HttpError::ConnectionFailed(
            "refused".to_string(),
        )));
        let store = GraphqlHistoryStore::new(Arc::new(client), ClientConfig::new());
        let err = store.create_conversation("x").await.unwrap_err();
        assert!(matches!(err, HistoryError::Transport(_)));
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Success(Response::new(
            500,
            Bytes::from("boom"),
        )));
        let store = GraphqlHistoryStore::new(Arc::new(client), ClientConfig::new());
        let err = store.list_conversations().await.unwrap_err();
        assert_eq!(err, HistoryError::Rejected("HTTP 500: boom".to_string()));
    }

    #[tokio::test]
    async fn test_list_conversations() {
        let (store, _) = store_with(
            r#"{"data":{"get_mate_chats":{"items":[{"id":"a","title":"First","createdAt":"2026-01-01T00:00:00Z","updatedAt":"2026-01-01T00:00:00Z"},{"id":"b","title":null}],"pageInfo":{"limit":20,"page":1,"totalCount":2,"hasNext":false,"hasPrevious":false}}}}"#,
        );
        let chats = store.list_conversations().await.unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].display_title(), "First");
        assert_eq!(chats[1].display_title(), "Untitled chat");
    }

    #[tokio::test]
    async fn test_page_without_items_is_empty() {
        let (store, _) = store_with(r#"{"data":{"get_mate_messages":{"hasMore":false}}}"#);
        assert!(store.get_messages("chat-1").await.unwrap().is_empty());

        let (store, _) = store_with(r#"{"data":{"get_mate_chats":{}}}"#);
        assert!(store.list_conversations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_messages() {
        let (store, client) = store_with(
            r#"{"data":{"get_mate_messages":{"items":[{"id":"1","role":"user","content":"Q"},{"id":"2","role":"assistant","content":"A"}],"hasMore":false}}}"#,
        );
        let messages = store.get_messages("chat-1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user());
        assert_eq!(messages[1].content, "A");

        let sent: serde_json::Value =
            serde_json::from_str(client.get_requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["variables"]["input"]["chatId"], "chat-1");
    }

    #[tokio::test]
    async fn test_rename_conversation() {
        let (store, _) = store_with(
            r#"{"data":{"update_mate_chat_title":{"id":"c1","title":"Renamed"}}}"#,
        );
        let summary = store.rename_conversation("c1", "Renamed").await.unwrap();
        assert_eq!(summary.title.as_deref(), Some("Renamed"));
    }

    #[tokio::test]
    async fn test_delete_conversation_false_is_not_found() {
        let (store, _) = store_with(r#"{"data":{"delete_mate_chat":false}}"#);
        let err = store.delete_conversation("gone").await.unwrap_err();
        assert_eq!(err, HistoryError::NotFound("gone".to_string()));
    }

    #[tokio::test]
    async fn test_delete_all_conversations() {
        let (store, _) = store_with(r#"{"data":{"delete_all_mate_chats":true}}"#);
        assert!(store.delete_all_conversations().await.is_ok());
    }
}
