//! Trait seams for the external collaborators.
//!
//! - [`HttpClient`]: the transport, including streaming GET
//! - [`HistoryStore`]: persisted conversations and transcripts

pub mod history;
pub mod http;

pub use history::{HistoryError, HistoryStore};
pub use http::{ByteStream, Headers, HttpClient, HttpError, Response};
