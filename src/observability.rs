//! Logging initialization.
//!
//! Structured logging goes to stderr so that teed run output on stdout
//! stays clean for the user (and for anything piping it).

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// The default level is `warn` (`info` for this crate); `verbose` raises
/// everything to `debug`. `RUST_LOG` overrides both.
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "debug"
    } else {
        "warn,fair_cli=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second init (e.g. in tests) is harmless; ignore the error
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
