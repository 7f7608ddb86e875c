//! Errors returned by the session controller.

use thiserror::Error;

use crate::traits::HistoryError;

/// Why a session operation did not run or did not finish.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The prompt was empty or whitespace only.
    #[error("prompt is empty")]
    EmptyPrompt,

    /// A send is already creating a conversation or streaming a reply.
    #[error("a reply is already in progress")]
    Busy,

    /// The conversation could not be created, so nothing was streamed.
    #[error("failed to create conversation: {0}")]
    CreationFailed(#[source] HistoryError),

    /// The session has no conversation to operate on yet.
    #[error("no conversation has been created yet")]
    NoConversation,

    /// Reading or writing history failed.
    #[error(transparent)]
    History(#[from] HistoryError),
}

impl SessionError {
    /// True when the call was refused without touching any state.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SessionError::EmptyPrompt | SessionError::Busy | SessionError::NoConversation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections() {
        assert!(SessionError::EmptyPrompt.is_rejection());
        assert!(SessionError::Busy.is_rejection());
        assert!(!SessionError::CreationFailed(HistoryError::Transport("x".into())).is_rejection());
    }

    #[test]
    fn test_display() {
        let err = SessionError::CreationFailed(HistoryError::Rejected("quota".into()));
        assert!(err.to_string().starts_with("failed to create conversation"));
        assert_eq!(SessionError::Busy.to_string(), "a reply is already in progress");
    }
}
