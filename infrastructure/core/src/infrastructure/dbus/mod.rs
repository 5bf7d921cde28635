// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! D-Bus signal adapters
//!
//! Domain events leave and enter the process as D-Bus signals. Each event type
//! has one [`DbusEvent`] adapter; adapters are grouped in [`SignalPackage`]s and
//! indexed by the [`DbusSignals`] catalog, which both the emitter and the
//! listener consult.
//!
//! # Flow
//!
//! ```text
//! Application ──emit──► DbusSignalEmitter ──catalog lookup──► DbusEvent::transform/sign
//!                                  │
//!                                  └──► BusConnection::send_signal
//!
//! BusConnection::subscribe ──► DbusSignalListener::process_message
//!                                  │  tokenize member name
//!                                  │  catalog lookup ──► DbusEvent::parse
//!                                  └──► spawned task ──► Application::accept
//! ```
//!
//! The transport sits behind [`BusConnector`]: [`ZbusConnector`] talks to the real
//! system or session bus, [`InMemoryBus`] fans signals out inside the process.

pub mod bus;
pub mod emitter;
pub mod event;
pub mod listener;
pub mod memory;
pub mod message;
pub mod signal_name;
pub mod signals;
pub mod zbus_bus;

pub use bus::{BusConnection, BusConnector, InboundStream};
pub use emitter::DbusSignalEmitter;
pub use event::{check_signature, BusType, DbusEvent};
pub use listener::{DbusSignalListener, Dispatch, DEFAULT_MAX_IN_FLIGHT};
pub use memory::InMemoryBus;
pub use message::{InboundMessage, MessageKind, OutboundSignal, SignalMatch};
pub use signal_name::{camel_to_snake, event_type_for_signal, parse_signal_name, signal_name_for};
pub use signals::{DbusSignals, SignalPackage, StaticPackage};
pub use zbus_bus::ZbusConnector;

/// Errors raised by the D-Bus adapters.
///
/// Emission and dispatch never surface these to the application; they are
/// logged where they occur.
#[derive(Debug, thiserror::Error)]
pub enum DbusError {
    #[error("No d-bus emitters found")]
    NoEmitters,

    #[error("No d-bus emitter registered for event {event_type}")]
    NoAdapter { event_type: String },

    #[error("Bad implementation of {adapter}: signature '{signature}' does not match {params} parameter(s)")]
    SignatureMismatch {
        adapter: String,
        signature: String,
        params: usize,
    },

    #[error("Adapter {adapter} cannot handle event {event_type}")]
    UnsupportedEvent { adapter: String, event_type: String },

    #[error("Cannot parse signal {signal}: {reason}")]
    Parse { signal: String, reason: String },

    #[error("Invalid signal name '{0}'")]
    InvalidSignalName(String),

    #[error("Could not load signal package {package}: {reason}")]
    Package { package: String, reason: String },

    #[error("D-Bus transport error: {0}")]
    Transport(#[from] zbus::Error),
}
