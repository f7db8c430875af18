//! Tracing subscriber setup.
//!
//! Logs go to stderr without timestamps; stdout belongs to the program.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "PSEUDO_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Filter from `PSEUDO_LOG`, falling back to `warn`. `verbose` forces `debug`.
pub fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(verbose: bool) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false);
    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(filter(verbose))
        .try_init();
}
