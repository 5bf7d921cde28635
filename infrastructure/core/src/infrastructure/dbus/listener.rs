// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! D-Bus Signal Listener
//!
//! Primary port that subscribes to the signal of every adapter in the
//! catalog and forwards the decoded domain events to the application.
//!
//! # Dispatch
//!
//! ```text
//! inbound message
//!   ├── not a signal ─────────────────────────► Ignored
//!   ├── member name does not resolve ─────────► Discarded (debug)
//!   ├── adapter cannot parse the body ────────► Discarded (warn)
//!   └── parsed event ──► spawned accept task ─► Forwarded
//! ```
//!
//! Delivery is at-most-once: a discarded signal is never retried. Forwarding
//! runs on tasks tracked in a `JoinSet`, at most `max_in_flight` at a time;
//! task errors and panics are logged when the tasks are reaped. The loop runs
//! until its cancellation token fires or every subscription stream ends.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::{Arc, OnceLock};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::bus::{BusConnector, InboundStream};
use super::event::DbusEvent;
use super::message::{InboundMessage, MessageKind, SignalMatch};
use super::signal_name::event_type_for_signal;
use super::signals::DbusSignals;
use super::DbusError;
use crate::domain::event::Event;
use crate::domain::ports::{Application, PrimaryPort};

pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// What became of one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Forwarded,
    Discarded,
    Ignored,
}

pub struct DbusSignalListener {
    signals: Arc<DbusSignals>,
    connector: Arc<dyn BusConnector>,
    app: OnceLock<Arc<dyn Application>>,
    max_in_flight: usize,
    shutdown: CancellationToken,
}

impl DbusSignalListener {
    pub fn new(signals: Arc<DbusSignals>, connector: Arc<dyn BusConnector>) -> Self {
        Self {
            signals,
            connector,
            app: OnceLock::new(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Token that stops the listening loop when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn app(&self) -> Option<&Arc<dyn Application>> {
        self.app.get()
    }

    /// Adapters to subscribe to, ordered by signal name.
    pub fn signal_receivers(&self) -> Vec<Arc<dyn DbusEvent>> {
        let mut receivers: Vec<Arc<dyn DbusEvent>> = self.signals.signals().values().cloned().collect();
        receivers.sort_by(|a, b| a.name().cmp(b.name()));
        receivers
    }

    /// Subscribe and process inbound signals until shut down.
    pub async fn listen(&self, app: Arc<dyn Application>) -> Result<(), DbusError> {
        if self.app.set(app.clone()).is_err() {
            debug!("Listener application already set; keeping the first one");
        }

        let receivers = self.signal_receivers();
        if receivers.is_empty() {
            warn!("No receivers configured for {}!", app.name());
            return Ok(());
        }

        let mut streams: Vec<InboundStream> = Vec::with_capacity(receivers.len());
        for receiver in &receivers {
            let rule = SignalMatch::new(receiver.interface(), receiver.path(), receiver.name());
            let connection = self.connector.connect(receiver.bus_type()).await?;
            streams.push(connection.subscribe(&rule).await?);
            info!("Subscribed to signal {} via {}", receiver.name(), receiver.path());
        }

        let mut inbound = futures::stream::select_all(streams);
        let mut tasks: JoinSet<anyhow::Result<()>> = JoinSet::new();

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("D-Bus listener shutting down");
                    break;
                }
                Some(result) = tasks.join_next(), if !tasks.is_empty() => {
                    log_task_result(result);
                }
                next = inbound.next() => match next {
                    Some(message) => {
                        while tasks.len() >= self.max_in_flight {
                            match tasks.join_next().await {
                                Some(result) => log_task_result(result),
                                None => break,
                            }
                        }
                        self.process_message(&app, message, &mut tasks);
                    }
                    None => {
                        info!("All d-bus subscriptions closed");
                        break;
                    }
                },
            }
        }

        while let Some(result) = tasks.join_next().await {
            log_task_result(result);
        }

        Ok(())
    }

    /// Route one inbound message; never blocks on the application.
    pub fn process_message(
        &self,
        app: &Arc<dyn Application>,
        message: InboundMessage,
        tasks: &mut JoinSet<anyhow::Result<()>>,
    ) -> Dispatch {
        if message.kind != MessageKind::Signal {
            return Dispatch::Ignored;
        }

        let Some(member) = message.member.clone() else {
            debug!("Discarding signal without member: {:?}", message);
            return Dispatch::Discarded;
        };
        info!("Received signal {}", member);

        match self.parse(&message, &member) {
            Some(event) => {
                let app = app.clone();
                tasks.spawn(async move {
                    debug!("Received d-bus signal: {:?}", event);
                    app.accept(event).await
                });
                Dispatch::Forwarded
            }
            None => {
                warn!("Discarding unparseable message: {:?}", message);
                Dispatch::Discarded
            }
        }
    }

    /// Decode a signal into its domain event through the adapter sending it.
    pub fn parse(&self, message: &InboundMessage, signal: &str) -> Option<Arc<dyn Event>> {
        let Some(adapter) = self.signals.find_by_signal(signal) else {
            match event_type_for_signal(signal) {
                Some(event_type) => debug!("Discarding unparseable event: no adapter sends {} ({})", signal, event_type),
                None => debug!("Discarding unparseable event: '{}' names no event", signal),
            }
            return None;
        };

        match adapter.parse(message) {
            Ok(event) => Some(event),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }
}

fn log_task_result(result: Result<anyhow::Result<()>, JoinError>) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Application failed to accept d-bus event: {:#}", e),
        Err(e) if e.is_panic() => error!("D-Bus forwarding task panicked: {}", e),
        Err(e) => debug!("D-Bus forwarding task cancelled: {}", e),
    }
}

#[async_trait]
impl PrimaryPort for DbusSignalListener {
    fn priority(&self) -> i32 {
        100
    }

    async fn entrypoint(&self, app: Arc<dyn Application>) -> anyhow::Result<()> {
        self.listen(app).await?;
        Ok(())
    }
}
