// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// In-Memory Bus - Process-local signal fan-out
//
// Uses a tokio broadcast channel in place of the D-Bus daemon. Every
// subscription sees every published signal that matches its rule. Slow
// subscribers lose the oldest signals, the same at-most-once guarantee the
// real bus gives.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::bus::{BusConnection, BusConnector, InboundStream};
use super::event::BusType;
use super::message::{InboundMessage, OutboundSignal, SignalMatch};
use super::DbusError;

#[derive(Clone)]
pub struct InMemoryBus {
    sender: Arc<broadcast::Sender<InboundMessage>>,
}

impl InMemoryBus {
    /// Capacity is how many messages a subscriber may fall behind before
    /// it starts losing the oldest ones.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create a bus with default capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Publish a raw message; returns how many subscribers received it.
    pub fn publish(&self, message: InboundMessage) -> usize {
        let receiver_count = self.sender.send(message).unwrap_or(0);
        if receiver_count == 0 {
            debug!("No subscribers listening on the in-memory bus");
        }
        receiver_count
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl BusConnector for InMemoryBus {
    async fn connect(&self, _bus_type: BusType) -> Result<Arc<dyn BusConnection>, DbusError> {
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl BusConnection for InMemoryBus {
    async fn send_signal(&self, signal: &OutboundSignal) -> Result<(), DbusError> {
        self.publish(signal.clone().into());
        Ok(())
    }

    async fn subscribe(&self, rule: &SignalMatch) -> Result<InboundStream, DbusError> {
        let receiver = self.sender.subscribe();
        let rule = rule.clone();

        let stream = futures::stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => return Some((message, receiver)),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("In-memory bus subscriber lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .filter(move |message| futures::future::ready(rule.matches(message)));

        Ok(stream.boxed())
    }
}
