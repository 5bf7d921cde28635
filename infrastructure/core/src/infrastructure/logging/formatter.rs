// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;

pub const DEFAULT_MAX_CATEGORY_LENGTH: usize = 30;

/// Keep the trailing `::` segments of `category` that fit in `max_length`.
/// The last segment is always kept; anything cut is marked with `...`.
pub fn truncate_category(category: &str, max_length: usize) -> String {
    let mut tokens = category.rsplit("::");
    let mut truncated = tokens.next().unwrap_or_default().to_string();

    for token in tokens {
        let candidate = format!("{}::{}", token, truncated);
        if candidate.len() > max_length {
            break;
        }
        truncated = candidate;
    }

    if truncated.len() < category.len() {
        format!("...{}", truncated)
    } else {
        truncated
    }
}

/// `[app] 2026-01-31 12:00:00 - category - LEVEL - message`
///
/// The category is the event's `category` field when present, otherwise its
/// target. Unknown applications show as `[!!]`.
pub struct TruncateCategoryFormatter {
    app_name: Option<String>,
    max_category_length: usize,
}

impl TruncateCategoryFormatter {
    pub fn new(app_name: Option<String>) -> Self {
        Self {
            app_name,
            max_category_length: DEFAULT_MAX_CATEGORY_LENGTH,
        }
    }

    pub fn with_max_category_length(mut self, max_category_length: usize) -> Self {
        self.max_category_length = max_category_length;
        self
    }
}

#[derive(Default)]
struct Fields {
    category: Option<String>,
    message: String,
    rest: String,
}

impl Visit for Fields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "category" => self.category = Some(value.to_string()),
            "message" => self.message.push_str(value),
            name => {
                let _ = write!(self.rest, " {}={}", name, value);
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "category" => self.category = Some(format!("{:?}", value)),
            "message" => {
                let _ = write!(self.message, "{:?}", value);
            }
            name => {
                let _ = write!(self.rest, " {}={:?}", name, value);
            }
        }
    }
}

impl<S, N> FormatEvent<S, N> for TruncateCategoryFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(&self, _ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();
        let mut fields = Fields::default();
        event.record(&mut fields);

        let category = fields.category.as_deref().unwrap_or_else(|| meta.target());
        let app = self.app_name.as_deref().unwrap_or("!!");

        writeln!(
            writer,
            "[{}] {} - {} - {} - {}{}",
            app,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            truncate_category(category, self.max_category_length),
            meta.level(),
            fields.message,
            fields.rest
        )
    }
}
