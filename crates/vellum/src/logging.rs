//! Tracing subscriber setup.

use crate::{LogFormat, LoggingConfig};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};
use vellum_error::ConfigError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Events go to stderr so that
/// content written to stdout stays clean. Call once per process.
///
/// # Errors
///
/// Returns an error if the filter directives are invalid or a global subscriber
/// is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ConfigError::new(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install tracing subscriber: {}", e)))
}
