//! Unified error type for the mate client.
//!
//! `MateError` consolidates the domain errors so callers at the edge (the
//! CLI, or an embedding UI) can classify, log and word failures uniformly.

use std::fmt;

use super::category::ErrorCategory;
use super::network::NetworkError;
use super::session::SessionError;
use super::stream::StreamError;
use crate::traits::{HistoryError, HttpError};

/// Unified error type for every mate operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MateError {
    /// Transport-level failure.
    Network(NetworkError),

    /// Event stream failure.
    Stream(StreamError),

    /// History store failure.
    History(HistoryError),

    /// Session controller refusal or failure.
    Session(SessionError),
}

fn history_category(err: &HistoryError) -> ErrorCategory {
    match err {
        HistoryError::Transport(_) => ErrorCategory::Network,
        HistoryError::Rejected(_) => ErrorCategory::Server,
        HistoryError::InvalidResponse(_) => ErrorCategory::Client,
        HistoryError::NotFound(_) => ErrorCategory::User,
    }
}

fn history_user_message(err: &HistoryError) -> String {
    match err {
        HistoryError::Transport(_) => {
            "Unable to reach the chat history service. Please try again.".to_string()
        }
        HistoryError::Rejected(_) => "The chat history service refused the request.".to_string(),
        HistoryError::InvalidResponse(_) => {
            "The chat history service sent an unexpected response.".to_string()
        }
        HistoryError::NotFound(id) => format!("Chat '{}' was not found.", id),
    }
}

fn history_error_code(err: &HistoryError) -> &'static str {
    match err {
        HistoryError::Transport(_) => "E_HIST_TRANSPORT",
        HistoryError::Rejected(_) => "E_HIST_REJECTED",
        HistoryError::InvalidResponse(_) => "E_HIST_INVALID",
        HistoryError::NotFound(_) => "E_HIST_NOT_FOUND",
    }
}

impl MateError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            MateError::Network(NetworkError::HttpStatus { status, .. })
                if *status == 401 || *status == 403 =>
            {
                ErrorCategory::Auth
            }
            MateError::Network(NetworkError::HttpStatus { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            MateError::Network(NetworkError::HttpStatus { .. }) => ErrorCategory::Client,
            MateError::Network(NetworkError::InvalidUrl { .. }) => ErrorCategory::Configuration,
            MateError::Network(NetworkError::Cancelled) => ErrorCategory::User,
            MateError::Network(_) => ErrorCategory::Network,
            MateError::Stream(err) => {
                if err.is_line_local() {
                    ErrorCategory::Client
                } else if matches!(err, StreamError::ConnectionLost { .. }) {
                    ErrorCategory::Network
                } else {
                    ErrorCategory::Server
                }
            }
            MateError::History(err) => history_category(err),
            MateError::Session(SessionError::CreationFailed(err))
            | MateError::Session(SessionError::History(err)) => history_category(err),
            MateError::Session(_) => ErrorCategory::User,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            MateError::Network(err) => err.is_retryable(),
            MateError::Stream(err) => err.is_retryable(),
            MateError::History(err) => history_category(err).is_retryable(),
            MateError::Session(SessionError::CreationFailed(err))
            | MateError::Session(SessionError::History(err)) => {
                history_category(err).is_retryable()
            }
            MateError::Session(_) => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            MateError::Network(err) => err.user_message(),
            MateError::Stream(err) => err.user_message(),
            MateError::History(err) => history_user_message(err),
            MateError::Session(SessionError::EmptyPrompt) => "Type a message first.".to_string(),
            MateError::Session(SessionError::Busy) => {
                "Wait for the current reply to finish, or cancel it.".to_string()
            }
            MateError::Session(SessionError::NoConversation) => {
                "Send a message to start a conversation first.".to_string()
            }
            MateError::Session(SessionError::CreationFailed(_)) => {
                "Failed to send message. Please try again.".to_string()
            }
            MateError::Session(SessionError::History(err)) => history_user_message(err),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            MateError::Network(err) => err.error_code(),
            MateError::Stream(err) => err.error_code(),
            MateError::History(err) => history_error_code(err),
            MateError::Session(SessionError::EmptyPrompt) => "E_SESSION_EMPTY",
            MateError::Session(SessionError::Busy) => "E_SESSION_BUSY",
            MateError::Session(SessionError::NoConversation) => "E_SESSION_NO_CHAT",
            MateError::Session(SessionError::CreationFailed(_)) => "E_SESSION_CREATE",
            MateError::Session(SessionError::History(err)) => history_error_code(err),
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for MateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MateError::Network(err) => write!(f, "{}", err),
            MateError::Stream(err) => write!(f, "{}", err),
            MateError::History(err) => write!(f, "{}", err),
            MateError::Session(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for MateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MateError::Network(err) => Some(err),
            MateError::Stream(err) => Some(err),
            MateError::History(err) => Some(err),
            MateError::Session(err) => Some(err),
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<NetworkError> for MateError {
    fn from(err: NetworkError) -> Self {
        MateError::Network(err)
    }
}

impl From<StreamError> for MateError {
    fn from(err: StreamError) -> Self {
        MateError::Stream(err)
    }
}

impl From<HistoryError> for MateError {
    fn from(err: HistoryError) -> Self {
        MateError::History(err)
    }
}

impl From<SessionError> for MateError {
    fn from(err: SessionError) -> Self {
        MateError::Session(err)
    }
}

impl From<HttpError> for MateError {
    fn from(err: HttpError) -> Self {
        MateError::Network(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_network_categories() {
        let status = |status| -> MateError {
            HttpError::ServerError {
                status,
                message: String::new(),
            }
            .into()
        };
        assert_eq!(status(401).category(), ErrorCategory::Auth);
        assert_eq!(status(502).category(), ErrorCategory::Server);
        assert_eq!(status(404).category(), ErrorCategory::Client);

        let conn: MateError = HttpError::ConnectionFailed("refused".into()).into();
        assert_eq!(conn.category(), ErrorCategory::Network);
        assert!(conn.is_retryable());

        let url: MateError = HttpError::InvalidUrl("::".into()).into();
        assert_eq!(url.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_stream_categories() {
        let parse: MateError = StreamError::MissingType.into();
        assert_eq!(parse.category(), ErrorCategory::Client);
        assert!(!parse.is_retryable());

        let backend: MateError = StreamError::BackendError {
            message: "boom".into(),
        }
        .into();
        assert_eq!(backend.category(), ErrorCategory::Server);
        assert!(backend.is_retryable());
    }

    #[test]
    fn test_session_errors() {
        let busy: MateError = SessionError::Busy.into();
        assert_eq!(busy.category(), ErrorCategory::User);
        assert!(!busy.is_retryable());
        assert_eq!(busy.error_code(), "E_SESSION_BUSY");

        let create: MateError =
            SessionError::CreationFailed(HistoryError::Transport("down".into())).into();
        assert_eq!(create.category(), ErrorCategory::Network);
        assert!(create.is_retryable());
        assert_eq!(create.user_message(), "Failed to send message. Please try again.");
        assert!(create.source().is_some());
    }

    #[test]
    fn test_history_not_found() {
        let err: MateError = HistoryError::NotFound("chat-9".into()).into();
        assert_eq!(err.category(), ErrorCategory::User);
        assert!(err.user_message().contains("chat-9"));
        assert_eq!(err.error_code(), "E_HIST_NOT_FOUND");
    }
}
