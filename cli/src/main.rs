// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # EDA Host
//!
//! The `eda` binary runs an event-driven application behind its primary
//! ports.
//!
//! ## Flags
//!
//! - `-v/--debug`, `-vv/--trace`, `-q/--quiet` - logging
//! - `-1/--one-shot` - apply the command line and exit
//! - `-es-p`, `-es-esdb-u`, `-es-esdb-r-c-f` - event-sourcing settings
//! - `--http-host`, `--http-port`, `--grpc-address`, `--no-dbus` - host ports
//!
//! Settings may also come from the environment or a `.env` file.

use anyhow::Result;

use eda_infrastructure::Host;
use eda_infrastructure_core::infrastructure::cli::CliError;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    match Host::new("eda").run(std::env::args_os()).await {
        Ok(_) => Ok(()),
        Err(e) => match e.downcast_ref::<CliError>() {
            Some(CliError::Arguments(usage)) => usage.exit(),
            _ => Err(e),
        },
    }
}
