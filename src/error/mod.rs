//! Unified error handling for the mate client.
//!
//! - **Error Categories**: high-level classification for handling decisions
//! - **Domain-specific Errors**: network, stream, history and session errors
//! - **Unified Error Type**: `MateError` consolidates all of them
//!
//! # Error Categories
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout, dropped body | Yes |
//! | Auth | 401/403 from the server | No |
//! | Server | 5xx, error events, store rejections | Yes |
//! | Client | Malformed data, unexpected responses | No |
//! | User | Empty prompt, busy session, unknown chat | No |
//! | Configuration | Bad base URL | No |
//!
//! Errors on this level never end up in the transcript. A failed reply
//! carries one as its reason, and the session shows a fixed fallback
//! message instead; see [`crate::lifecycle`].

mod category;
mod mate_error;
mod network;
mod session;
mod stream;

pub use category::ErrorCategory;
pub use mate_error::MateError;
pub use network::NetworkError;
pub use session::SessionError;
pub use stream::StreamError;
