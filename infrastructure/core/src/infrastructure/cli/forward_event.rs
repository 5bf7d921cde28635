// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use clap::{ArgMatches, Command};
use std::sync::Arc;
use tracing::{debug, warn};

use super::handler::{CliError, CliHandler};
use crate::domain::event::Event;
use crate::domain::ports::{Application, EventEmitter};

/// Builds a domain event out of command-line arguments.
pub trait EventBuilder: Send + Sync {
    fn description(&self) -> &str;

    fn add_arguments(&self, command: Command) -> Command;

    /// `None` when the arguments do not describe an event.
    fn build_event(&self, app: &dyn Application, matches: &ArgMatches) -> Option<Arc<dyn Event>>;
}

/// Emits the event an [`EventBuilder`] assembles from the command line.
pub struct ForwardEventCli<B> {
    builder: B,
    emitter: Option<Arc<dyn EventEmitter>>,
}

impl<B: EventBuilder> ForwardEventCli<B> {
    pub fn new(builder: B, emitter: Option<Arc<dyn EventEmitter>>) -> Self {
        Self { builder, emitter }
    }

    pub async fn emit_event(&self, event: Arc<dyn Event>) -> Result<(), CliError> {
        match &self.emitter {
            Some(emitter) => {
                debug!("Emitting {}", event.event_type());
                emitter.emit(event).await?;
            }
            None => warn!("No event emitter available; dropping {}", event.event_type()),
        }
        Ok(())
    }
}

#[async_trait]
impl<B: EventBuilder> CliHandler for ForwardEventCli<B> {
    fn description(&self) -> &str {
        self.builder.description()
    }

    fn is_one_shot_compatible(&self) -> bool {
        true
    }

    fn add_arguments(&self, command: Command) -> Command {
        self.builder.add_arguments(command)
    }

    async fn handle(&self, app: &dyn Application, matches: &ArgMatches) -> Result<(), CliError> {
        if let Some(event) = self.builder.build_event(app, matches) {
            self.emit_event(event).await?;
        }
        Ok(())
    }
}
