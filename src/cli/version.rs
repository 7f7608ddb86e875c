//! Version command for the mate CLI.

/// The current version of mate, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Handle the --version command.
///
/// Prints the version string and exits successfully.
pub fn handle_version_command() -> ! {
    println!("mate {}", VERSION);
    std::process::exit(0)
}
