// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use tracing::Level;

use crate::domain::ports::LoggingPort;

/// Category-scoped logger for code that cannot pick a `tracing` target
/// statically. The category travels as the `category` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    category: String,
}

impl Logger {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn log(&self, level: Level, message: &str) {
        let category = self.category.as_str();
        match level {
            Level::TRACE => tracing::trace!(category, "{}", message),
            Level::DEBUG => tracing::debug!(category, "{}", message),
            Level::INFO => tracing::info!(category, "{}", message),
            Level::WARN => tracing::warn!(category, "{}", message),
            _ => tracing::error!(category, "{}", message),
        }
    }

    pub fn trace(&self, message: &str) {
        self.log(Level::TRACE, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAdapter;

impl LoggingPort for LoggingAdapter {
    type Logger = Logger;

    fn logger(&self, category: &str) -> Logger {
        Logger::new(category)
    }
}
