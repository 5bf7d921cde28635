// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Port contracts
//!
//! The application orchestrator implements [`Application`]; adapters implement
//! [`PrimaryPort`] (inbound, driven by the host in ascending priority),
//! [`EventEmitter`] (outbound) or [`LoggingPort`].

use async_trait::async_trait;
use std::sync::Arc;

use super::config::{EventSourcingConfig, LoggingConfig};
use super::event::Event;

/// The application that owns port lifecycle and processes domain events.
#[async_trait]
pub trait Application: Send + Sync {
    fn name(&self) -> &str;

    /// Process an inbound domain event.
    async fn accept(&self, event: Arc<dyn Event>) -> anyhow::Result<()>;

    fn accept_configure_logging(&self, _config: LoggingConfig) {}

    fn accept_one_shot(&self, _one_shot: bool) {}

    fn accept_configure_eventsourcing(&self, _config: EventSourcingConfig) {}
}

/// Outbound port publishing domain events to some transport.
#[async_trait]
pub trait EventEmitter: Send + Sync {
    async fn emit(&self, event: Arc<dyn Event>) -> anyhow::Result<()>;
}

/// Inbound port started by the host once the application is built.
#[async_trait]
pub trait PrimaryPort: Send + Sync {
    /// Lower values run first.
    fn priority(&self) -> i32;

    async fn entrypoint(&self, app: Arc<dyn Application>) -> anyhow::Result<()>;
}

/// Provides category-scoped loggers.
pub trait LoggingPort: Send + Sync {
    type Logger;

    fn logger(&self, category: &str) -> Self::Logger;
}
