// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! D-Bus Signal Emitter
//!
//! Outbound port that publishes domain events as D-Bus signals.
//!
//! Emission is best-effort: a missing adapter, a broken adapter or an
//! unreachable bus is logged and never reported back to the caller, so
//! domain processing is not blocked by an outbound transport. A connection
//! is opened per emitted event.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::bus::BusConnector;
use super::event::check_signature;
use super::message::OutboundSignal;
use super::signals::DbusSignals;
use super::DbusError;
use crate::domain::event::Event;
use crate::domain::ports::EventEmitter;

pub struct DbusSignalEmitter {
    signals: Arc<DbusSignals>,
    connector: Arc<dyn BusConnector>,
}

impl DbusSignalEmitter {
    pub fn new(signals: Arc<DbusSignals>, connector: Arc<dyn BusConnector>) -> Self {
        Self { signals, connector }
    }

    pub fn signals(&self) -> &DbusSignals {
        &self.signals
    }

    /// Translate and send one event, reporting why it was not sent.
    pub async fn send(&self, event: &dyn Event) -> Result<OutboundSignal, DbusError> {
        if self.signals.is_empty() {
            return Err(DbusError::NoEmitters);
        }

        let adapter = self
            .signals
            .get(event.event_type())
            .ok_or_else(|| DbusError::NoAdapter {
                event_type: event.event_type().to_string(),
            })?;

        let path = adapter.build_path(event);
        let body = adapter.transform(event)?;
        let signature = adapter.sign(event);
        check_signature(adapter.interface(), &signature, &body)?;

        let signal = OutboundSignal {
            path,
            interface: adapter.interface().to_string(),
            member: adapter.name().to_string(),
            signature,
            body,
        };

        let bus_type = adapter.bus_type();
        let connection = self.connector.connect(bus_type).await?;
        connection.send_signal(&signal).await?;

        info!(
            "Sent signal {} on path {} to d-bus {}",
            signal.interface, signal.path, bus_type
        );

        Ok(signal)
    }
}

#[async_trait]
impl EventEmitter for DbusSignalEmitter {
    async fn emit(&self, event: Arc<dyn Event>) -> anyhow::Result<()> {
        match self.send(event.as_ref()).await {
            Ok(_) => {}
            Err(e @ DbusError::NoEmitters) => warn!("{}", e),
            Err(e @ DbusError::NoAdapter { .. }) => warn!("{} ({:?})", e, event),
            Err(e) => error!("Could not emit {}: {}", event.event_type(), e),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::dbus::memory::InMemoryBus;
    use crate::infrastructure::dbus::message::SignalMatch;
    use crate::testing::{DbusSomethingHappened, SomethingHappened, Unmapped};
    use crate::infrastructure::dbus::{BusConnection, DbusEvent};
    use futures::StreamExt;
    use tracing_test::traced_test;

    fn emitter_with(adapter: DbusSomethingHappened, bus: &InMemoryBus) -> DbusSignalEmitter {
        let signals = DbusSignals::with_adapters("pythoneda.realm.rydnr", vec![Arc::new(adapter)]);
        DbusSignalEmitter::new(Arc::new(signals), Arc::new(bus.clone()))
    }

    fn event() -> SomethingHappened {
        SomethingHappened {
            value: "hello".to_string(),
            id: "42".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_publishes_signal() {
        let bus = InMemoryBus::new(10);
        let adapter = DbusSomethingHappened::default();
        let rule = SignalMatch::new(adapter.interface(), adapter.path(), adapter.name());
        let mut stream = bus.subscribe(&rule).await.unwrap();
        let emitter = emitter_with(adapter, &bus);

        let signal = emitter.send(&event()).await.unwrap();
        assert_eq!(signal.signature, "ss");

        let received = stream.next().await.unwrap();
        assert_eq!(received.body, vec!["hello".to_string(), "42".to_string()]);
        assert_eq!(received.member.as_deref(), Some("pythoneda_realm_rydnr_events_SomethingHappened"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_emit_without_adapter_warns_once() {
        let bus = InMemoryBus::new(10);
        let emitter = emitter_with(DbusSomethingHappened::default(), &bus);

        let result = emitter.emit(Arc::new(Unmapped)).await;

        assert!(result.is_ok());
        logs_assert(|lines: &[&str]| {
            let warnings = lines.iter().filter(|line| line.contains(" WARN ")).count();
            if warnings == 1 {
                Ok(())
            } else {
                Err(format!("expected exactly one warning, got {warnings}"))
            }
        });
        assert!(logs_contain("No d-bus emitter registered for event acme.events.Unmapped"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_emit_with_empty_catalog_warns() {
        let bus = InMemoryBus::new(10);
        let emitter = DbusSignalEmitter::new(Arc::new(DbusSignals::new(vec![])), Arc::new(bus));

        assert!(emitter.emit(Arc::new(event())).await.is_ok());
        assert!(logs_contain("No d-bus emitters found"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_signature_mismatch_is_logged_not_sent() {
        let bus = InMemoryBus::new(10);
        let adapter = DbusSomethingHappened::with_bad_signature();
        let rule = SignalMatch::new(adapter.interface(), adapter.path(), adapter.name());
        let mut stream = bus.subscribe(&rule).await.unwrap();
        let emitter = emitter_with(adapter, &bus);

        assert!(matches!(
            emitter.send(&event()).await,
            Err(DbusError::SignatureMismatch { params: 2, .. })
        ));
        assert!(emitter.emit(Arc::new(event())).await.is_ok());
        assert!(logs_contain("ERROR"));

        let nothing = tokio::time::timeout(std::time::Duration::from_millis(50), stream.next()).await;
        assert!(nothing.is_err());
    }
}
