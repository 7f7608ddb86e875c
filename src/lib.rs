//! mate - streaming chat client.
//!
//! Sends a prompt to a chat server, reads the reply as a `data:` event
//! stream and keeps a conversation transcript.
//!
//! - [`sse`]: bytes to protocol events
//! - [`consumer`]: one streaming connection to one [`consumer::StreamOutcome`]
//! - [`lifecycle`]: send states and what each outcome adds to the transcript
//! - [`session`]: [`session::ChatSession`], the controller tying it together
//! - [`traits`] / [`adapters`]: transport and history store seams

pub mod adapters;
pub mod cli;
pub mod config;
pub mod consumer;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod session;
pub mod sse;
pub mod traits;
