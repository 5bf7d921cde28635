// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::message::InboundMessage;
use super::DbusError;
use crate::domain::event::Event;

/// Which message bus a signal travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusType {
    #[default]
    System,
    Session,
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusType::System => write!(f, "system"),
            BusType::Session => write!(f, "session"),
        }
    }
}

/// Binds one domain event type to its D-Bus signal representation.
///
/// Signal parameters are strings. `sign` returns the D-Bus type signature
/// for the parameters `transform` produces; the emitter refuses to send when
/// they disagree. `parse` is the inverse of `transform`.
pub trait DbusEvent: Send + Sync {
    /// Signal member name, `<namespace tokens>_<EventSimpleName>`.
    fn name(&self) -> &str;

    /// Fully-qualified interface the signal is sent on.
    fn interface(&self) -> &str;

    fn path(&self) -> &str;

    /// Object path for a particular event.
    fn build_path(&self, _event: &dyn Event) -> String {
        self.path().to_string()
    }

    fn bus_type(&self) -> BusType {
        BusType::System
    }

    /// Fully-qualified name of the domain event type this adapter handles.
    fn event_type(&self) -> &str;

    fn transform(&self, event: &dyn Event) -> Result<Vec<String>, DbusError>;

    fn sign(&self, event: &dyn Event) -> String;

    fn parse(&self, message: &InboundMessage) -> Result<Arc<dyn Event>, DbusError>;
}

/// Verify a declared signature against a string parameter list.
pub fn check_signature(adapter: &str, signature: &str, params: &[String]) -> Result<(), DbusError> {
    let matches = signature.len() == params.len() && signature.chars().all(|c| c == 's');
    if matches {
        Ok(())
    } else {
        Err(DbusError::SignatureMismatch {
            adapter: adapter.to_string(),
            signature: signature.to_string(),
            params: params.len(),
        })
    }
}
