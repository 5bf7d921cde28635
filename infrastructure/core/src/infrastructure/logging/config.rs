// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::OnceLock;
use tracing::{debug, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{filter::ParseError, fmt, reload, EnvFilter, Registry};

use super::formatter::TruncateCategoryFormatter;
use crate::domain::config::LoggingConfig;

/// Dependencies logged one level less verbosely than the application.
pub const NOISY_TARGETS: &[&str] = &["h2", "hyper", "tower", "zbus"];

static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("Failed to install the log subscriber: {0}")]
    Install(#[from] TryInitError),

    #[error("Failed to reload the log filter: {0}")]
    Reload(#[from] reload::Error),
}

/// Quiet wins, then trace, debug and info; nothing set means warnings only.
pub fn level_for(config: &LoggingConfig) -> Level {
    if config.quiet {
        Level::ERROR
    } else if config.trace {
        Level::TRACE
    } else if config.debug {
        Level::DEBUG
    } else if config.info {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// The next less verbose level. `ERROR` stays `ERROR`.
pub fn next_higher_level(level: Level) -> Level {
    match level {
        Level::TRACE => Level::DEBUG,
        Level::DEBUG => Level::INFO,
        Level::INFO => Level::WARN,
        _ => Level::ERROR,
    }
}

pub fn filter_directives(level: Level) -> String {
    let noisy = next_higher_level(level);
    std::iter::once(level.to_string().to_lowercase())
        .chain(
            NOISY_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, noisy.to_string().to_lowercase())),
        )
        .collect::<Vec<_>>()
        .join(",")
}

fn env_filter(level: Level) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    Ok(EnvFilter::builder().parse(filter_directives(level))?)
}

/// Install the subscriber, or update its filter when already installed.
/// `RUST_LOG`, when set, takes precedence over the switches.
pub fn configure_logging(config: LoggingConfig, app_name: Option<&str>) -> Result<(), LoggingError> {
    let level = level_for(&config);
    let filter = env_filter(level)?;

    if let Some(handle) = FILTER.get() {
        handle.reload(filter)?;
        debug!("Log level set to {}", level);
        return Ok(());
    }

    let (filter_layer, handle) = reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().event_format(TruncateCategoryFormatter::new(app_name.map(str::to_string))))
        .try_init()?;

    if FILTER.set(handle).is_err() {
        debug!("Log filter handle already registered");
    }
    debug!("Logging configured at {}", level);
    Ok(())
}
