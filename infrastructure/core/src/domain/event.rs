// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain event seam
//!
//! The event model itself is owned by the domain layer of each application.
//! Adapters only see events through the [`Event`] trait object, identify them
//! by their fully-qualified type name and downcast when they need fields.

use std::any::Any;
use std::fmt::Debug;

/// An immutable fact produced or consumed by the application.
pub trait Event: Debug + Send + Sync + 'static {
    /// Fully-qualified, dot-separated type name
    /// (e.g. `pythoneda.realm.rydnr.events.SomethingHappened`).
    fn event_type(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn Event + 'a {
    /// Downcast to a concrete event type.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

/// Last segment of a dot-separated event type name.
pub fn simple_name(event_type: &str) -> &str {
    event_type.rsplit('.').next().unwrap_or(event_type)
}
