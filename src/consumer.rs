//! Stream consumer: turns one streaming connection into an outcome.
//!
//! The read loop pulls transport chunks one at a time, threads them through
//! an explicit [`ReadState`], reports accumulated text after every `chunk`
//! event and stops at the first terminal event, transport failure, end of
//! stream or cancellation. The connection is dropped on every exit path.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::{MateError, StreamError};
use crate::sse::{EventDecoder, ProtocolEvent};
use crate::traits::{Headers, HttpClient, HttpError};

/// How a stream session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The server finished the reply, or hung up after sending text.
    Completed(String),
    /// The reply failed. `partial` holds whatever text arrived first.
    Errored { reason: MateError, partial: String },
    /// The user cancelled. Holds whatever text arrived first.
    Cancelled(String),
}

impl StreamOutcome {
    /// Text accumulated before the stream ended.
    pub fn text(&self) -> &str {
        match self {
            StreamOutcome::Completed(text) => text,
            StreamOutcome::Errored { partial, .. } => partial,
            StreamOutcome::Cancelled(text) => text,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamOutcome::Cancelled(_))
    }

    /// Why the reply failed, if it did.
    pub fn error(&self) -> Option<&MateError> {
        match self {
            StreamOutcome::Errored { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            StreamOutcome::Completed(_) => "completed",
            StreamOutcome::Errored { .. } => "errored",
            StreamOutcome::Cancelled(_) => "cancelled",
        }
    }
}

/// Everything one read loop carries between chunks.
#[derive(Debug, Clone, Default)]
pub struct ReadState {
    events: EventDecoder,
    accumulated: String,
}

impl ReadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode, frame and parse one chunk. Returns the events it completed.
    pub fn step(&mut self, chunk: &[u8]) -> Vec<ProtocolEvent> {
        self.events.push(chunk)
    }

    /// Text accumulated so far.
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Lines dropped as unparseable so far.
    pub fn dropped_lines(&self) -> usize {
        self.events.dropped_lines()
    }

    fn append(&mut self, text: &str) {
        self.accumulated.push_str(text);
    }

    fn into_text(self) -> String {
        self.accumulated
    }
}

/// Read a connection to its end.
///
/// `on_progress` receives the accumulated text after each `chunk` event,
/// synchronously and in arrival order. Cancellation is checked at every
/// chunk boundary: a chunk already read is processed fully, and no further
/// read is issued once the token fires.
pub async fn consume<S>(
    mut stream: S,
    cancellation: &CancellationToken,
    mut on_progress: impl FnMut(&str),
) -> StreamOutcome
where
    S: Stream<Item = Result<Bytes, HttpError>> + Unpin,
{
    let mut state = ReadState::new();

    loop {
        if cancellation.is_cancelled() {
            tracing::debug!(
                "Stream cancelled after {} bytes",
                state.accumulated().len()
            );
            return StreamOutcome::Cancelled(state.into_text());
        }

        let next = tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                tracing::debug!("Stream cancelled while waiting for data");
                return StreamOutcome::Cancelled(state.into_text());
            }
            next = stream.next() => next,
        };

        let chunk = match next {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => {
                tracing::error!("Stream read failed: {}", e);
                return StreamOutcome::Errored {
                    reason: StreamError::ConnectionLost {
                        message: e.to_string(),
                    }
                    .into(),
                    partial: state.into_text(),
                };
            }
            None => break,
        };

        for event in state.step(&chunk) {
            match event {
                ProtocolEvent::Chunk { text } => {
                    state.append(&text);
                    on_progress(state.accumulated());
                }
                ProtocolEvent::Complete { text } => {
                    if let Some(text) = text {
                        state.append(&text);
                    }
                    return StreamOutcome::Completed(state.into_text());
                }
                ProtocolEvent::Error { message } => {
                    tracing::warn!("Server reported stream error: {}", message);
                    return StreamOutcome::Errored {
                        reason: StreamError::BackendError { message }.into(),
                        partial: state.into_text(),
                    };
                }
            }
        }
    }

    state.events.finish();
    if state.dropped_lines() > 0 {
        tracing::debug!("{} stream lines were dropped", state.dropped_lines());
    }

    if state.accumulated().is_empty() {
        StreamOutcome::Errored {
            reason: StreamError::NoContent.into(),
            partial: String::new(),
        }
    } else {
        tracing::warn!(
            "Stream ended without a terminal event; keeping {} bytes as complete",
            state.accumulated().len()
        );
        StreamOutcome::Completed(state.into_text())
    }
}

/// Open a streaming GET and consume it.
///
/// Opening is raced against the token, so a cancel during connection setup
/// ends the session as `Cancelled` with no text. A failure to open (network
/// error, non-2xx status) is `Errored` with no partial.
pub async fn open_and_consume(
    client: &dyn HttpClient,
    url: &str,
    headers: &Headers,
    cancellation: &CancellationToken,
    on_progress: impl FnMut(&str),
) -> StreamOutcome {
    let opened = tokio::select! {
        biased;
        _ = cancellation.cancelled() => {
            tracing::debug!("Stream cancelled before the connection opened");
            return StreamOutcome::Cancelled(String::new());
        }
        opened = client.get_stream(url, headers) => opened,
    };

    match opened {
        Ok(stream) => consume(stream, cancellation, on_progress).await,
        Err(e) => {
            tracing::error!("Failed to open stream: {}", e);
            StreamOutcome::Errored {
                reason: MateError::from(e),
                partial: String::new(),
            }
        }
    }
}
