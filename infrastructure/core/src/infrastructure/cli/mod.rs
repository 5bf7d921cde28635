// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command-line primary ports
//!
//! Each [`CliHandler`] contributes its flags to one shared `clap::Command`;
//! the [`CliDispatcher`] parses the process arguments once and lets every
//! handler translate its flags into calls on the application.

pub mod eventsourcing_config;
pub mod forward_event;
pub mod handler;
pub mod logging_config;
pub mod one_shot;

pub use eventsourcing_config::{EventsourcingConfigCli, EventsourcingArgs};
pub use forward_event::{EventBuilder, ForwardEventCli};
pub use handler::{normalize_legacy_flags, CliDispatcher, CliError, CliHandler};
pub use logging_config::{LoggingArgs, LoggingConfigCli};
pub use one_shot::{OneShotArgs, OneShotCli};
