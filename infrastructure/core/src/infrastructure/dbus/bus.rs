// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Transport seam between the signal adapters and a concrete message bus.

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

use super::event::BusType;
use super::message::{InboundMessage, OutboundSignal, SignalMatch};
use super::DbusError;

/// Messages matching a subscription, in arrival order.
pub type InboundStream = BoxStream<'static, InboundMessage>;

/// Opens connections to a bus.
#[async_trait]
pub trait BusConnector: Send + Sync {
    async fn connect(&self, bus_type: BusType) -> Result<Arc<dyn BusConnection>, DbusError>;
}

#[async_trait]
pub trait BusConnection: Send + Sync {
    async fn send_signal(&self, signal: &OutboundSignal) -> Result<(), DbusError>;

    /// Register a match rule and stream the messages it selects.
    async fn subscribe(&self, rule: &SignalMatch) -> Result<InboundStream, DbusError>;
}
