// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use eda_infrastructure_core::infrastructure::logging::configure_logging;
use eda_infrastructure_core::{Application, Event, EventSourcingConfig, LoggingConfig};

/// The application the host binary runs: it applies configuration from the
/// command line and acknowledges every inbound event.
pub struct EdaHost {
    name: String,
    one_shot: AtomicBool,
    logging: Mutex<Option<LoggingConfig>>,
    eventsourcing: Mutex<Option<EventSourcingConfig>>,
    accepted: AtomicUsize,
}

impl EdaHost {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            one_shot: AtomicBool::new(false),
            logging: Mutex::new(None),
            eventsourcing: Mutex::new(None),
            accepted: AtomicUsize::new(0),
        }
    }

    pub fn is_one_shot(&self) -> bool {
        self.one_shot.load(Ordering::SeqCst)
    }

    pub fn logging(&self) -> Option<LoggingConfig> {
        *self.logging.lock()
    }

    pub fn eventsourcing(&self) -> Option<EventSourcingConfig> {
        self.eventsourcing.lock().clone()
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Application for EdaHost {
    fn name(&self) -> &str {
        &self.name
    }

    async fn accept(&self, event: Arc<dyn Event>) -> anyhow::Result<()> {
        self.accepted.fetch_add(1, Ordering::SeqCst);
        info!("{} accepted {}", self.name, event.event_type());
        debug!("Event: {:?}", event);
        Ok(())
    }

    fn accept_configure_logging(&self, config: LoggingConfig) {
        *self.logging.lock() = Some(config);
        if let Err(e) = configure_logging(config, Some(&self.name)) {
            warn!("Logging left unchanged: {}", e);
        }
    }

    fn accept_one_shot(&self, one_shot: bool) {
        self.one_shot.store(one_shot, Ordering::SeqCst);
    }

    fn accept_configure_eventsourcing(&self, config: EventSourcingConfig) {
        debug!(
            "Event-sourcing persistence: {}",
            config.persistence_module.as_deref().unwrap_or("none")
        );
        *self.eventsourcing.lock() = Some(config);
    }
}
