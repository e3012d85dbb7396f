use std::env;

use tracing::debug;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{directive}'")]
    Filter {
        directive: String,
        #[source]
        source: ParseError,
    },
    #[error("unable to install tracing subscriber: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global subscriber.
///
/// A well-formed `RUST_LOG` wins; otherwise `APP_LOG_LEVEL` (via `config`) is used.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let (filter, source) = resolve_filter(env::var("RUST_LOG").ok(), &config.log_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Install)?;

    debug!(source, "telemetry initialised");
    Ok(())
}

fn resolve_filter(
    rust_log: Option<String>,
    configured: &str,
) -> Result<(EnvFilter, &'static str), TelemetryError> {
    if let Some(directives) = rust_log.filter(|value| !value.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return Ok((filter, "RUST_LOG"));
        }
    }
    Ok((build_filter(configured)?, "APP_LOG_LEVEL"))
}

fn build_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|source| TelemetryError::Filter {
        directive: directive.to_string(),
        source,
    })
}
