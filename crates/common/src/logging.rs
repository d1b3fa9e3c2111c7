//! Tracing subscriber bootstrap.
//!
//! Embedding applications usually install their own subscriber; this helper
//! exists for binaries and tests that just want sensible output.

use tracing_subscriber::EnvFilter;

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one event per line
    #[default]
    Pretty,
    /// Newline-delimited JSON
    Json,
}

/// Install a global `tracing` subscriber.
///
/// `debug` selects the default level (`debug` instead of `info`); a
/// `RUST_LOG` environment filter always wins when present. Returns `false`
/// if a global subscriber was already installed.
pub fn init_tracing(debug: bool, format: LogFormat) -> bool {
    let log_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.is_ok()
}
