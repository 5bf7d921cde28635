// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Domain seam shared by every adapter.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Event model and port contracts the adapters depend on

pub mod config;
pub mod event;
pub mod ports;

pub use config::{EventSourcingConfig, LoggingConfig};
pub use event::{simple_name, Event};
pub use ports::{Application, EventEmitter, LoggingPort, PrimaryPort};
