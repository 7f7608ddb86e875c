//! Implementations of the trait seams.
//!
//! - [`ReqwestHttpClient`] - production transport
//! - [`GraphqlHistoryStore`] - production history store
//! - [`mock`] - test doubles for both

pub mod graphql_history;
pub mod mock;
pub mod reqwest_http;

pub use graphql_history::GraphqlHistoryStore;
pub use reqwest_http::ReqwestHttpClient;
