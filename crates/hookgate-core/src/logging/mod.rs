//! Structured logging with `tracing`.
//!
//! Hook processes own stdout for their decision document, so every log line
//! goes to stderr. Optionally, errors are also appended to the shared error
//! log through [`ErrorLogLayer`].

pub mod error_log;

use std::path::PathBuf;

pub use error_log::ErrorLogLayer;

/// Env var consulted before `RUST_LOG` for the log filter.
pub const LOG_ENV_VAR: &str = "HOOKGATE_LOG";

fn env_filter(level: &str) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global subscriber with stderr output only.
///
/// Subsequent calls are no-ops.
pub fn init_subscriber(level: &str) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}

/// Initialize the global subscriber with stderr output and an error log file.
pub fn init_subscriber_with_error_log(level: &str, error_log: PathBuf) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt_layer)
        .with(ErrorLogLayer::new(error_log))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_subscriber_does_not_panic() {
        // Multiple calls should be safe (no-op after first)
        init_subscriber("warn");
        init_subscriber("debug");
        init_subscriber_with_error_log("warn", std::env::temp_dir().join("unused.log"));
    }
}
