// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! EDA Infrastructure
//!
//! Ports and adapters that connect an event-driven application to the outside
//! world: D-Bus signals, HTTP events, gRPC, the command line and logging.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Translate external protocols to and from domain events

pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;

#[cfg(test)]
pub(crate) mod testing;
