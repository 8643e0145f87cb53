use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{self, LoadedConfig, LoggingSettings};

const DEFAULT_LEVEL: &str = "warn";
const LOG_FILE_PREFIX: &str = "soulharness.log";

/// Install the tracing subscriber.
///
/// Precedence: `RUST_LOG`, then `--debug`, then `--log-level`, then the configured level.
/// Console output goes to stderr; a daily-rolling file is added when a log directory is
/// configured. The returned guard must live until the process exits.
pub fn init_logging(
    level: Option<&str>,
    debug: bool,
    settings: &LoggingSettings,
) -> Result<Option<WorkerGuard>> {
    let level: tracing::Level = if debug {
        tracing::Level::DEBUG
    } else {
        level
            .or(settings.level.as_deref())
            .unwrap_or(DEFAULT_LEVEL)
            .parse()
            .context("Invalid log level")?
    };

    let (file_layer, guard) = match settings.dir.as_deref() {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    config::load(path).context("Failed to load configuration")
}
