//! Mock implementations for testing.
//!
//! This module provides mock implementations of the trait seams, enabling
//! unit testing without network access.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses and scripted streams
//! - [`InMemoryHistoryStore`] - History store with scriptable create failures

pub mod history;
pub mod http;

pub use history::InMemoryHistoryStore;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
