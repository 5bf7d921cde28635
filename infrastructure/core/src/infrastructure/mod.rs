// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod cli;
pub mod dbus;
pub mod http;
pub mod logging;
pub mod serverless;
