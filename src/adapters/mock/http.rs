//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses, scripted byte streams, or errors.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
    /// Whether the body was requested as a stream
    pub streaming: bool,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful response
    Success(Response),
    /// Return an error
    Error(HttpError),
    /// Stream these chunks, then end
    Stream(Vec<Bytes>),
    /// Stream these chunks, then stay open until the consumer drops the stream
    StreamThenHang(Vec<Bytes>),
    /// Stream these chunks, then fail with the error
    StreamThenError(Vec<Bytes>, HttpError),
}

impl MockResponse {
    /// Convenience: a finite stream from string chunks.
    pub fn stream<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Stream(to_bytes(chunks))
    }

    /// Convenience: string chunks, then an open connection with no more data.
    pub fn stream_then_hang<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::StreamThenHang(to_bytes(chunks))
    }
}

/// Body stream that counts itself live until the consumer drops it.
struct TrackedStream {
    inner: ByteStream,
    live: Arc<AtomicUsize>,
}

impl TrackedStream {
    fn wrap(inner: ByteStream, live: &Arc<AtomicUsize>) -> ByteStream {
        live.fetch_add(1, Ordering::SeqCst);
        Box::pin(Self {
            inner,
            live: live.clone(),
        })
    }
}

impl Stream for TrackedStream {
    type Item = Result<Bytes, HttpError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

fn to_bytes<I, S>(chunks: I) -> Vec<Bytes>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    chunks
        .into_iter()
        .map(|c| Bytes::from(c.into()))
        .collect()
}

/// Mock HTTP client for testing.
///
/// Responses are matched by exact URL, then by URL prefix, then the default.
///
/// # Example
///
/// ```ignore
/// use mate::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.set_default_response(MockResponse::stream([
///     "data: {\"type\":\"chunk\",\"text\":\"Hi\"}\n",
///     "data: {\"type\":\"complete\"}\n",
/// ]));
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured responses by URL pattern
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Streams handed out and not yet dropped
    live_streams: Arc<AtomicUsize>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            live_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set a response for a specific URL (or URL prefix).
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of streaming connections opened so far.
    pub fn stream_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.streaming)
            .count()
    }

    /// Streaming connections still held by a consumer.
    pub fn open_streams(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record_request(
        &self,
        method: &str,
        url: &str,
        headers: &Headers,
        body: Option<String>,
        streaming: bool,
    ) {
        let mut requests = self.requests.lock().unwrap();
        requests.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
            streaming,
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = self.responses.lock().unwrap();

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        for (pattern, response) in responses.iter() {
            if url.starts_with(pattern) {
                return Some(response.clone());
            }
        }

        let default = self.default_response.lock().unwrap();
        default.clone()
    }

    fn plain_response(&self, url: &str) -> Result<Response, HttpError> {
        match self.get_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(_) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None, false);
        self.plain_response(url)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()), false);
        self.plain_response(url)
    }

    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        self.record_request("GET", url, headers, None, true);

        let stream: ByteStream = match self.get_response(url) {
            Some(MockResponse::Stream(chunks)) => {
                Box::pin(futures::stream::iter(chunks.into_iter().map(Ok)))
            }
            Some(MockResponse::StreamThenHang(chunks)) => Box::pin(
                futures::stream::iter(chunks.into_iter().map(Ok))
                    .chain(futures::stream::pending()),
            ),
            Some(MockResponse::StreamThenError(chunks, err)) => Box::pin(
                futures::stream::iter(chunks.into_iter().map(Ok))
                    .chain(futures::stream::once(async move { Err(err) })),
            ),
            Some(MockResponse::Error(err)) => return Err(err),
            Some(MockResponse::Success(response)) if !response.is_success() => {
                return Err(HttpError::ServerError {
                    status: response.status,
                    message: response.text().unwrap_or_default(),
                })
            }
            Some(MockResponse::Success(_)) => {
                return Err(HttpError::Other(
                    "Non-stream response on stream request".to_string(),
                ))
            }
            None => {
                return Err(HttpError::Other(format!("No mock response for URL: {}", url)))
            }
        };

        Ok(TrackedStream::wrap(stream, &self.live_streams))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_with_response() {
        let client = MockHttpClient::new();
        client.set_response(
            "https://example.com/test",
            MockResponse::Success(Response::new(200, Bytes::from("Hello"))),
        );

        let response = client
            .get("https://example.com/test", &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.body, Bytes::from("Hello"));

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert!(!requests[0].streaming);
    }

    #[tokio::test]
    async fn test_prefix_match() {
        let client = MockHttpClient::new();
        client.set_response("https://example.com/chats/", MockResponse::stream(["a"]));
        let result = client
            .get_stream("https://example.com/chats/1/stream?message=hi", &Headers::new())
            .await;
        assert!(result.is_ok());
        assert_eq!(client.stream_count(), 1);
    }

    #[tokio::test]
    async fn test_get_stream_yields_chunks() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::stream(["one", "two"]));

        let stream = client
            .get_stream("https://example.com/s", &Headers::new())
            .await
            .unwrap();
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].as_ref().unwrap(), &Bytes::from("two"));
    }

    #[tokio::test]
    async fn test_open_streams_tracks_drops() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::stream_then_hang(["one"]));

        let stream = client
            .get_stream("https://example.com/s", &Headers::new())
            .await
            .unwrap();
        assert_eq!(client.open_streams(), 1);
        drop(stream);
        assert_eq!(client.open_streams(), 0);
    }

    #[tokio::test]
    async fn test_get_stream_then_error() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::StreamThenError(
            vec![Bytes::from("one")],
            HttpError::Io("reset".to_string()),
        ));

        let stream = client
            .get_stream("https://example.com/s", &Headers::new())
            .await
            .unwrap();
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], Err(HttpError::Io("reset".to_string())));
    }

    #[tokio::test]
    async fn test_get_stream_status_error() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Success(Response::new(
            401,
            Bytes::from("Unauthorized"),
        )));
        let result = client.get_stream("https://example.com/s", &Headers::new()).await;
        assert!(matches!(
            result,
            Err(HttpError::ServerError { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_no_mock_response() {
        let client = MockHttpClient::new();
        let result = client.get("https://example.com/none", &Headers::new()).await;
        assert!(result.is_err());
    }
}
