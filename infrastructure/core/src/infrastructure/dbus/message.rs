// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Transport-neutral message shapes exchanged with a BusConnection.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    MethodCall,
    MethodReturn,
    Error,
    Signal,
}

/// A message received from the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub kind: MessageKind,
    pub interface: Option<String>,
    pub path: Option<String>,
    pub member: Option<String>,
    pub signature: String,
    pub body: Vec<String>,
}

impl InboundMessage {
    pub fn signal(
        interface: impl Into<String>,
        path: impl Into<String>,
        member: impl Into<String>,
        signature: impl Into<String>,
        body: Vec<String>,
    ) -> Self {
        Self {
            kind: MessageKind::Signal,
            interface: Some(interface.into()),
            path: Some(path.into()),
            member: Some(member.into()),
            signature: signature.into(),
            body,
        }
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.body.get(index).map(String::as_str)
    }
}

/// A signal about to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundSignal {
    pub path: String,
    pub interface: String,
    pub member: String,
    pub signature: String,
    pub body: Vec<String>,
}

impl From<OutboundSignal> for InboundMessage {
    fn from(signal: OutboundSignal) -> Self {
        InboundMessage::signal(
            signal.interface,
            signal.path,
            signal.member,
            signal.signature,
            signal.body,
        )
    }
}

/// Subscription filter; renders as a D-Bus `AddMatch` rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalMatch {
    pub interface: String,
    pub path: String,
    pub member: String,
}

impl SignalMatch {
    pub fn new(interface: impl Into<String>, path: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            path: path.into(),
            member: member.into(),
        }
    }

    pub fn matches(&self, message: &InboundMessage) -> bool {
        message.kind == MessageKind::Signal
            && message.interface.as_deref() == Some(self.interface.as_str())
            && message.path.as_deref() == Some(self.path.as_str())
            && message.member.as_deref() == Some(self.member.as_str())
    }
}

impl fmt::Display for SignalMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type='signal',interface='{}',path='{}',member='{}'",
            self.interface, self.path, self.member
        )
    }
}
