//! Client configuration.
//!
//! Endpoints, credentials and limits for talking to the chat backend.

use std::time::Duration;

use crate::traits::Headers;

/// Default backend base URL (local development server)
pub const DEFAULT_BASE_URL: &str = "http://localhost:5555";

/// Characters of the first prompt used as a new conversation's title
pub const DEFAULT_TITLE_HINT_CHARS: usize = 50;

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "MATE_BASE_URL";
/// Environment variable overriding the GraphQL endpoint
pub const ENV_GRAPHQL_URL: &str = "MATE_GRAPHQL_URL";
/// Environment variable holding the bearer token
pub const ENV_TOKEN: &str = "MATE_TOKEN";

/// Configuration for the chat client.
///
/// Use the builder pattern to customize it.
///
/// # Example
///
/// ```ignore
/// use mate::config::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_base_url("https://chat.example.com")
///     .with_token("secret");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL; the stream endpoint hangs off it
    pub base_url: String,
    /// GraphQL endpoint (defaults to `{base_url}/graphql`)
    pub graphql_url: Option<String>,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Characters of the prompt used as title hint on creation
    pub title_hint_chars: usize,
    /// Timeout for non-streaming requests
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            graphql_url: None,
            token: None,
            title_hint_chars: DEFAULT_TITLE_HINT_CHARS,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `MATE_*` environment variables; unset ones keep defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        if let Some(url) = non_empty(ENV_BASE_URL) {
            config.base_url = url;
        }
        config.graphql_url = non_empty(ENV_GRAPHQL_URL);
        config.token = non_empty(ENV_TOKEN);
        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_graphql_url(mut self, url: impl Into<String>) -> Self {
        self.graphql_url = Some(url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_title_hint_chars(mut self, chars: usize) -> Self {
        self.title_hint_chars = chars;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// GraphQL endpoint URL.
    pub fn graphql_endpoint(&self) -> String {
        match &self.graphql_url {
            Some(url) => url.clone(),
            None => format!("{}/graphql", self.base()),
        }
    }

    /// Streaming endpoint for one prompt in one conversation.
    pub fn stream_url(&self, conversation_id: &str, prompt: &str) -> String {
        format!(
            "{}/mate/chats/{}/stream?message={}",
            self.base(),
            urlencoding::encode(conversation_id),
            urlencoding::encode(prompt)
        )
    }

    /// Authorization header, when a token is configured.
    pub fn auth_headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let Some(token) = &self.token {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers
    }

    /// Headers for the event-stream request.
    pub fn stream_headers(&self) -> Headers {
        let mut headers = self.auth_headers();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers
    }

    /// Headers for GraphQL requests.
    pub fn graphql_headers(&self) -> Headers {
        let mut headers = self.auth_headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }
}
