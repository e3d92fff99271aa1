//! Diagnostic logging setup
//!
//! Logs go to stderr; stdout carries command responses and hook output.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
///
/// Calling this more than once is harmless.
pub fn init(verbose: bool) {
    let default = if verbose {
        "regex_filter=debug"
    } else {
        "regex_filter=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
