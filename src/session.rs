//! Session controller: one conversation, one stream at a time.
//!
//! [`ChatSession`] owns the transcript, the lifecycle state and the
//! cancellation token of the active stream. All methods take `&self`, so a
//! session can sit in an `Arc` and be cancelled from another task while a
//! `send` is awaiting the network. The internal lock is never held across
//! an await point.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::consumer::{open_and_consume, StreamOutcome};
use crate::error::SessionError;
use crate::lifecycle::{assistant_message_for, creation_failure_message, LifecycleState};
use crate::models::{title_hint, Conversation, ConversationSummary, Message};
use crate::traits::{HistoryStore, HttpClient};

/// Notifications a session emits as a send progresses.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The lifecycle moved to a new state.
    StateChanged(LifecycleState),
    /// Accumulated reply text after a chunk arrived.
    Progress(String),
    /// A message was added to the transcript.
    MessageAppended(Message),
}

#[derive(Debug, Default)]
struct Inner {
    conversation: Conversation,
    state: LifecycleState,
    cancel: Option<CancellationToken>,
    streaming_text: String,
}

/// A chat conversation driven against the streaming endpoint.
pub struct ChatSession {
    client: Arc<dyn HttpClient>,
    history: Arc<dyn HistoryStore>,
    config: ClientConfig,
    inner: Mutex<Inner>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl ChatSession {
    /// Start a session for a new conversation. The identity is created on
    /// the first send.
    pub fn new(
        client: Arc<dyn HttpClient>,
        history: Arc<dyn HistoryStore>,
        config: ClientConfig,
    ) -> Self {
        Self {
            client,
            history,
            config,
            inner: Mutex::new(Inner::default()),
            events: None,
        }
    }

    /// Resume an existing conversation, loading its transcript.
    pub async fn open(
        client: Arc<dyn HttpClient>,
        history: Arc<dyn HistoryStore>,
        config: ClientConfig,
        conversation_id: &str,
    ) -> Result<Self, SessionError> {
        let messages = history.get_messages(conversation_id).await?;
        tracing::info!(
            "Opened conversation {} with {} messages",
            conversation_id,
            messages.len()
        );

        let session = Self::new(client, history, config);
        session.lock().conversation = Conversation::existing(conversation_id, messages);
        Ok(session)
    }

    /// Deliver [`SessionEvent`]s to `sender`.
    pub fn with_events(mut self, sender: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Send a prompt and stream the reply.
    ///
    /// Rejected without side effects when the prompt is blank or another
    /// send is in flight. When the conversation has no identity yet, one is
    /// created first; if that fails, the failure is recorded in the
    /// transcript and returned, and the next send tries again.
    ///
    /// Dropping the future before it resolves cancels the stream and puts
    /// the session back to `Idle`.
    pub async fn send(&self, prompt: &str) -> Result<StreamOutcome, SessionError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }

        let started = {
            let mut inner = self.lock();
            let next = inner.state.begin_send(inner.conversation.has_identity())?;
            self.transition(&mut inner, next);
            self.append(&mut inner, Message::user(prompt));
            let id = inner.conversation.id().map(str::to_string);
            id.map(|id| (id, self.issue_token(&mut inner)))
        };

        let guard = SendGuard { session: self };

        let (conversation_id, token) = match started {
            Some(started) => started,
            None => match self.create_identity(prompt).await {
                Ok(started) => started,
                Err(e) => {
                    guard.disarm();
                    return Err(e);
                }
            },
        };

        let url = self.config.stream_url(&conversation_id, prompt);
        let headers = self.config.stream_headers();
        tracing::debug!("Streaming reply for conversation {}", conversation_id);

        let outcome = open_and_consume(
            self.client.as_ref(),
            &url,
            &headers,
            &token,
            |accumulated| {
                let mut inner = self.lock();
                inner.streaming_text.clear();
                inner.streaming_text.push_str(accumulated);
                self.emit(SessionEvent::Progress(accumulated.to_string()));
            },
        )
        .await;

        match &outcome {
            StreamOutcome::Errored { reason, .. } => {
                tracing::error!(
                    "Reply in {} failed [{}]: {}",
                    conversation_id,
                    reason.error_code(),
                    reason
                );
            }
            other => {
                tracing::info!("Reply in {} {}", conversation_id, other.label());
            }
        }

        {
            let mut inner = self.lock();
            self.settle(&mut inner, &outcome);
        }
        guard.disarm();
        Ok(outcome)
    }

    /// Close out the active stream: record its reply and return to `Idle`.
    fn settle(&self, inner: &mut Inner, outcome: &StreamOutcome) {
        inner.cancel = None;
        inner.streaming_text.clear();
        if let Some(message) = assistant_message_for(outcome) {
            self.append(inner, message);
        }
        let next = inner.state.finish();
        self.transition(inner, next);
    }

    /// Undo a send whose future was dropped before it finished.
    ///
    /// A dropped stream counts as cancelled: the text received so far is
    /// kept. A dropped creation leaves the conversation without an identity.
    fn abandon(&self) {
        let mut inner = self.lock();
        match inner.state {
            LifecycleState::Idle => {}
            LifecycleState::Creating => {
                tracing::warn!("Send dropped while creating the conversation");
                let next = inner.state.creation_failed();
                self.transition(&mut inner, next);
            }
            LifecycleState::Streaming => {
                tracing::warn!("Send dropped while streaming; keeping the partial reply");
                if let Some(token) = inner.cancel.take() {
                    token.cancel();
                }
                let partial = std::mem::take(&mut inner.streaming_text);
                self.settle(&mut inner, &StreamOutcome::Cancelled(partial));
            }
        }
    }

    async fn create_identity(
        &self,
        prompt: &str,
    ) -> Result<(String, CancellationToken), SessionError> {
        let hint = title_hint(prompt, self.config.title_hint_chars);

        match self.history.create_conversation(&hint).await {
            Ok(id) => {
                tracing::info!("Created conversation {}", id);
                let mut inner = self.lock();
                inner.conversation.assign_identity(id.clone());
                let next = inner.state.identity_obtained();
                self.transition(&mut inner, next);
                let token = self.issue_token(&mut inner);
                Ok((id, token))
            }
            Err(e) => {
                tracing::error!("Failed to create conversation: {}", e);
                let mut inner = self.lock();
                self.append(&mut inner, creation_failure_message());
                let next = inner.state.creation_failed();
                self.transition(&mut inner, next);
                Err(SessionError::CreationFailed(e))
            }
        }
    }

    /// Cancel the active stream. Returns false when nothing was streaming.
    ///
    /// Safe to call from any task while `send` is awaiting data.
    pub fn cancel(&self) -> bool {
        let inner = self.lock();
        match &inner.cancel {
            Some(token) => {
                tracing::info!("Cancelling active stream");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Re-read the transcript from the history store.
    ///
    /// Replaces local messages with what the backend persisted, including
    /// the assistant turns it recorded from streamed replies.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let id = {
            let inner = self.lock();
            if inner.state.is_busy() {
                return Err(SessionError::Busy);
            }
            inner
                .conversation
                .id()
                .map(str::to_string)
                .ok_or(SessionError::NoConversation)?
        };

        let messages = self.history.get_messages(&id).await?;

        let mut inner = self.lock();
        if inner.state.is_busy() || inner.conversation.id() != Some(id.as_str()) {
            return Err(SessionError::Busy);
        }
        inner.conversation.replace_messages(messages);
        Ok(())
    }

    /// List the caller's conversations from the history store.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, SessionError> {
        Ok(self.history.list_conversations().await?)
    }

    /// Snapshot of the transcript.
    pub fn transcript(&self) -> Vec<Message> {
        self.lock().conversation.messages().to_vec()
    }

    pub fn conversation_id(&self) -> Option<String> {
        self.lock().conversation.id().map(str::to_string)
    }

    pub fn state(&self) -> LifecycleState {
        self.lock().state
    }

    pub fn is_streaming(&self) -> bool {
        self.lock().state == LifecycleState::Streaming
    }

    /// Reply text received so far by the active stream.
    pub fn streaming_text(&self) -> String {
        self.lock().streaming_text.clone()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn issue_token(&self, inner: &mut Inner) -> CancellationToken {
        let token = CancellationToken::new();
        inner.cancel = Some(token.clone());
        token
    }

    fn transition(&self, inner: &mut Inner, next: LifecycleState) {
        tracing::info!("Session state {} -> {}", inner.state, next);
        inner.state = next;
        self.emit(SessionEvent::StateChanged(next));
    }

    fn append(&self, inner: &mut Inner, message: Message) {
        inner.conversation.push(message.clone());
        self.emit(SessionEvent::MessageAppended(message));
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }
}

/// Held by `send` from the moment it claims the session. If the send future
/// is dropped early, the session is returned to `Idle`.
struct SendGuard<'a> {
    session: &'a ChatSession,
}

impl SendGuard<'_> {
    fn disarm(self) {
        std::mem::forget(self);
    }
}

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        self.session.abandon();
    }
}
