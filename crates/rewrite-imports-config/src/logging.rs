//! Logging initialization with environment variable support

use crate::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// Environment variables (in priority order):
/// - `RUST_LOG`: Standard Rust log filter (takes precedence over all)
/// - `LOG_FORMAT`: Override format (json, pretty)
///
/// Logs always go to stderr so rewritten output on stdout stays clean.
/// Returns `false` if a global subscriber was already installed.
///
/// # Examples
///
/// ```bash
/// # Trace every rewritten reference
/// RUST_LOG=rewrite_imports=debug my-build
///
/// # Machine-readable logs in CI
/// LOG_FORMAT=json my-build
/// ```
pub fn initialize(config: &LoggingConfig) -> bool {
    let log_level = config.level.parse().unwrap_or(tracing::Level::INFO);

    // RUST_LOG directives take precedence over the configured level
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|f| parse_format(&f))
        .unwrap_or_else(|| config.format.clone());

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };
    result.is_ok()
}

fn parse_format(value: &str) -> Option<LogFormat> {
    match value.to_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "pretty" | "human" => Some(LogFormat::Pretty),
        _ => None,
    }
}
