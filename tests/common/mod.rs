//! Common helpers for integration tests.
//!
//! Builds event-stream bodies and mounts the two backend endpoints a chat
//! session talks to on a wiremock server.

#![allow(dead_code)]

use std::sync::Arc;

use mate::adapters::{GraphqlHistoryStore, ReqwestHttpClient};
use mate::config::ClientConfig;
use mate::session::ChatSession;
use mate::traits::{HistoryStore, HttpClient};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-auth-token";

/// One `chunk` event line.
pub fn chunk_line(text: &str) -> String {
    format!("data: {}\n", json!({ "type": "chunk", "text": text }))
}

/// One `complete` event line, optionally with trailing text.
pub fn complete_line(text: Option<&str>) -> String {
    match text {
        Some(text) => format!("data: {}\n", json!({ "type": "complete", "text": text })),
        None => "data: {\"type\":\"complete\"}\n".to_string(),
    }
}

/// One `error` event line.
pub fn error_line(message: &str) -> String {
    format!("data: {}\n", json!({ "type": "error", "message": message }))
}

/// An event-stream response with the given body.
pub fn event_stream(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/event-stream")
}

/// Config pointing both endpoints at the mock server.
pub fn test_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(server.uri())
        .with_token(TEST_TOKEN)
}

/// Answer `create_mate_chat` with `id`.
pub async fn mount_create_chat(server: &MockServer, id: &str) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("create_mate_chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "create_mate_chat": {
                    "id": id,
                    "title": "t",
                    "createdAt": "2026-01-05T10:00:00Z",
                    "updatedAt": "2026-01-05T10:00:00Z"
                }
            }
        })))
        .mount(server)
        .await;
}

/// The production stack wired to the mock server.
pub fn production_session(server: &MockServer) -> ChatSession {
    let config = test_config(server);
    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let history: Arc<dyn HistoryStore> =
        Arc::new(GraphqlHistoryStore::new(client.clone(), config.clone()));
    ChatSession::new(client, history, config)
}
