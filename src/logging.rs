//! Tracing setup for the `ovula` binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with a default level of `warn`.
///
/// Output goes to stderr so command output on stdout stays clean.
pub fn init() {
    init_with_level("warn")
}

/// Initialize logging with a specific default level.
///
/// `RUST_LOG` still takes precedence when set.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for tests (captured by the test harness)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
