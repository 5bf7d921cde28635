// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Logging
//!
//! `tracing` is the only logging facade. [`configure_logging`] installs the
//! global subscriber the first time it runs and afterwards only swaps its
//! level filter, so command-line switches can adjust verbosity after boot.

pub mod adapter;
pub mod config;
pub mod formatter;

pub use adapter::{Logger, LoggingAdapter};
pub use config::{configure_logging, filter_directives, level_for, next_higher_level, LoggingError, NOISY_TARGETS};
pub use formatter::{truncate_category, TruncateCategoryFormatter, DEFAULT_MAX_CATEGORY_LENGTH};
