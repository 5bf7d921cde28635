// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! EDA host library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Boots an application behind its primary ports

pub mod app;
pub mod host;
pub mod server;

pub use app::EdaHost;
pub use host::{Host, HostArgs, HostCli};
