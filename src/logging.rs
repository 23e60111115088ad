//! Logging setup
//!
//! `RUST_LOG` takes precedence over the configured level.

use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Build the filter from `RUST_LOG`, falling back to `level` for this crate
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("clientboard={}", level)))
}

/// Install the global subscriber
///
/// Logs go to stderr, or to `file` when configured. Fails if a global
/// subscriber is already set or the log file cannot be opened.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let json = config.format.eq_ignore_ascii_case("json");

    let layer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let writer = Mutex::new(file);
            if json {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer().with_ansi(false).with_writer(writer).boxed()
            }
        }
        None => {
            if json {
                fmt::layer().json().with_writer(std::io::stderr).boxed()
            } else {
                fmt::layer().with_writer(std::io::stderr).boxed()
            }
        }
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(layer)
        .try_init()?;

    Ok(())
}
