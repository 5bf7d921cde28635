// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Test fixtures: a domain event, its d-bus adapter and a recording application.

use async_trait::async_trait;
use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::domain::config::{EventSourcingConfig, LoggingConfig};
use crate::domain::event::Event;
use crate::domain::ports::Application;
use crate::infrastructure::dbus::{DbusError, DbusEvent, InboundMessage};

pub const SOMETHING_HAPPENED: &str = "pythoneda.realm.rydnr.events.SomethingHappened";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SomethingHappened {
    pub value: String,
    pub id: String,
}

impl Event for SomethingHappened {
    fn event_type(&self) -> &str {
        SOMETHING_HAPPENED
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct Unmapped;

impl Event for Unmapped {
    fn event_type(&self) -> &str {
        "acme.events.Unmapped"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct DbusSomethingHappened {
    path: String,
    signature: String,
    member: String,
    event_type: String,
}

impl DbusSomethingHappened {
    pub fn on_path(path: &str) -> Self {
        Self {
            path: path.to_string(),
            signature: "ss".to_string(),
            member: "pythoneda_realm_rydnr_events_SomethingHappened".to_string(),
            event_type: SOMETHING_HAPPENED.to_string(),
        }
    }

    /// An adapter whose declared signature disagrees with its parameters.
    pub fn with_bad_signature() -> Self {
        Self {
            signature: "s".to_string(),
            ..Self::default()
        }
    }

    /// An adapter sending under a member name other than the usual one.
    pub fn with_member(member: &str) -> Self {
        Self {
            member: member.to_string(),
            ..Self::default()
        }
    }

    /// An adapter registered for another event type and signal member.
    pub fn registered_as(event_type: &str, member: &str) -> Self {
        Self {
            member: member.to_string(),
            event_type: event_type.to_string(),
            ..Self::default()
        }
    }
}

impl Default for DbusSomethingHappened {
    fn default() -> Self {
        Self::on_path("/pythoneda/realm/rydnr/events")
    }
}

impl DbusEvent for DbusSomethingHappened {
    fn name(&self) -> &str {
        &self.member
    }

    fn interface(&self) -> &str {
        "pythoneda.realm.rydnr.events.infrastructure.dbus.DbusSomethingHappened"
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn transform(&self, event: &dyn Event) -> Result<Vec<String>, DbusError> {
        let event = event
            .downcast_ref::<SomethingHappened>()
            .ok_or_else(|| DbusError::UnsupportedEvent {
                adapter: self.interface().to_string(),
                event_type: event.event_type().to_string(),
            })?;
        Ok(vec![event.value.clone(), event.id.clone()])
    }

    fn sign(&self, _event: &dyn Event) -> String {
        self.signature.clone()
    }

    fn parse(&self, message: &InboundMessage) -> Result<Arc<dyn Event>, DbusError> {
        match (message.arg(0), message.arg(1)) {
            (Some(value), Some(id)) => Ok(Arc::new(SomethingHappened {
                value: value.to_string(),
                id: id.to_string(),
            })),
            _ => Err(DbusError::Parse {
                signal: self.name().to_string(),
                reason: format!("expected 2 arguments, got {}", message.body.len()),
            }),
        }
    }
}

/// Records every accepted event and configuration call.
#[derive(Default)]
pub struct RecordingApp {
    pub accepted: Mutex<Vec<Arc<dyn Event>>>,
    logging: Mutex<Option<LoggingConfig>>,
    one_shot: Mutex<Option<bool>>,
    eventsourcing: Mutex<Option<EventSourcingConfig>>,
}

impl RecordingApp {
    pub fn accepted_count(&self) -> usize {
        self.accepted.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn logging(&self) -> Option<LoggingConfig> {
        *self.logging.lock().unwrap()
    }

    pub fn one_shot(&self) -> Option<bool> {
        *self.one_shot.lock().unwrap()
    }

    pub fn eventsourcing(&self) -> Option<EventSourcingConfig> {
        self.eventsourcing.lock().unwrap().clone()
    }
}

#[async_trait]
impl Application for RecordingApp {
    fn name(&self) -> &str {
        "recording"
    }

    async fn accept(&self, event: Arc<dyn Event>) -> anyhow::Result<()> {
        self.accepted
            .lock()
            .map_err(|_| anyhow::anyhow!("poisoned"))?
            .push(event);
        Ok(())
    }

    fn accept_configure_logging(&self, config: LoggingConfig) {
        *self.logging.lock().unwrap() = Some(config);
    }

    fn accept_one_shot(&self, one_shot: bool) {
        *self.one_shot.lock().unwrap() = Some(one_shot);
    }

    fn accept_configure_eventsourcing(&self, config: EventSourcingConfig) {
        *self.eventsourcing.lock().unwrap() = Some(config);
    }
}
