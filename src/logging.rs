//! Diagnostic logging for the binary.
//!
//! Events go to stderr so they never mix with command output on stdout.
//! The filter comes from `GITLITE_LOG` (an `EnvFilter` directive string),
//! falling back to `warn`, or `debug` when verbose output was requested.

use tracing_subscriber::EnvFilter;

/// environment variable holding the log filter
pub const LOG_ENV: &str = "GITLITE_LOG";

/// the filter used when `GITLITE_LOG` is unset or invalid
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool) {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let filter = if verbose {
        EnvFilter::new(default_filter(true))
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter(false)))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
