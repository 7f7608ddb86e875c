//! CLI module for mate.
//!
//! - Argument parsing
//! - Version display
//! - Log subscriber setup
//! - The send and list commands
//!
//! # Usage
//!
//! ```ignore
//! use mate::cli::{parse_args, CliCommand};
//!
//! let args = parse_args(std::env::args());
//! mate::cli::init_tracing(args.verbose);
//! match args.command {
//!     CliCommand::Send { chat, prompt } => { /* build a session, run_send */ }
//!     _ => {}
//! }
//! ```

pub mod args;
pub mod commands;
pub mod logging;
pub mod version;

pub use args::{parse_args, CliArgs, CliCommand, USAGE};
pub use commands::{run_list, run_send, ReplyPrinter};
pub use logging::init_tracing;
pub use version::{handle_version_command, VERSION};
