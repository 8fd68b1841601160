//! Tracing subscriber setup

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter directive for the configured level; `verbose` forces debug
fn default_directive(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose { "debug" } else { config.level.as_str() };
    format!("skycast={level},tower_http={level},warn")
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the config.
pub fn init_tracing(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config, verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.pretty().try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
