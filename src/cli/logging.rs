//! Log subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter, used when no `-v` is given.
pub const LOG_ENV: &str = "MATE_LOG";

/// Filter directive for a `-v` count.
pub fn verbosity_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build the filter: `-v` flags win, then `MATE_LOG`, then `warn`.
pub fn build_filter(verbose: u8) -> EnvFilter {
    if verbose > 0 {
        return EnvFilter::new(verbosity_directive(verbose));
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Logs go to stderr so replies on stdout
/// stay clean.
pub fn init_tracing(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
