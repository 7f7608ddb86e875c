//! Lifecycle of one send: `Idle -> Creating -> Streaming -> Idle`.
//!
//! The transitions are plain functions over [`LifecycleState`] so the
//! session controller can apply them under its lock and tests can drive
//! them without any I/O.

use std::fmt;

use crate::consumer::StreamOutcome;
use crate::error::SessionError;
use crate::models::Message;

/// Shown when a stream fails before producing any text.
pub const STREAM_FAILURE_MESSAGE: &str = "Sorry, something went wrong.";

/// Shown when the conversation could not be created.
pub const CREATION_FAILURE_MESSAGE: &str = "Failed to send message. Please try again.";

/// Where a session is in its send cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// Ready for a new send.
    #[default]
    Idle,
    /// Waiting for the history store to issue a conversation identity.
    Creating,
    /// A stream session is open.
    Streaming,
}

impl LifecycleState {
    /// Accept a send. Goes to `Creating` when the conversation has no
    /// identity yet, straight to `Streaming` otherwise.
    pub fn begin_send(self, has_identity: bool) -> Result<LifecycleState, SessionError> {
        match self {
            LifecycleState::Idle if has_identity => Ok(LifecycleState::Streaming),
            LifecycleState::Idle => Ok(LifecycleState::Creating),
            LifecycleState::Creating | LifecycleState::Streaming => Err(SessionError::Busy),
        }
    }

    /// The history store issued an identity.
    pub fn identity_obtained(self) -> LifecycleState {
        debug_assert_eq!(self, LifecycleState::Creating);
        LifecycleState::Streaming
    }

    /// The history store failed to issue an identity.
    pub fn creation_failed(self) -> LifecycleState {
        debug_assert_eq!(self, LifecycleState::Creating);
        LifecycleState::Idle
    }

    /// The stream session reached a terminal outcome.
    pub fn finish(self) -> LifecycleState {
        debug_assert_eq!(self, LifecycleState::Streaming);
        LifecycleState::Idle
    }

    pub fn is_idle(self) -> bool {
        self == LifecycleState::Idle
    }

    /// True while a send is in flight, creation included.
    pub fn is_busy(self) -> bool {
        !self.is_idle()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Creating => "creating",
            LifecycleState::Streaming => "streaming",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The assistant turn a terminal outcome contributes to the transcript.
///
/// Non-empty text is always kept. With no text, only an error gets the
/// fallback message; a cancel or an empty completion adds nothing. The
/// server's error reason never reaches the transcript.
pub fn assistant_message_for(outcome: &StreamOutcome) -> Option<Message> {
    let text = outcome.text();
    if !text.is_empty() {
        return Some(Message::assistant(text));
    }
    match outcome {
        StreamOutcome::Errored { .. } => Some(Message::assistant(STREAM_FAILURE_MESSAGE)),
        StreamOutcome::Completed(_) | StreamOutcome::Cancelled(_) => None,
    }
}

/// The assistant turn recorded when conversation creation fails.
pub fn creation_failure_message() -> Message {
    Message::assistant(CREATION_FAILURE_MESSAGE)
}
