// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use clap::{ArgAction, ArgMatches, Args, Command, FromArgMatches};
use tracing::debug;

use super::handler::{CliError, CliHandler};
use crate::domain::config::LoggingConfig;
use crate::domain::ports::Application;

/// Logging switches. `-v` once means debug, twice means trace.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingArgs {
    /// Enable debug logging (-vv for trace)
    #[arg(short = 'v', long = "debug", action = ArgAction::Count)]
    pub verbosity: u8,

    /// Enable trace logging
    #[arg(long)]
    pub trace: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl LoggingArgs {
    pub fn config(&self) -> LoggingConfig {
        let trace = self.trace || self.verbosity >= 2;
        let debug = self.verbosity == 1;
        LoggingConfig::resolve(debug, trace, self.quiet)
    }
}

#[derive(Debug, Default)]
pub struct LoggingConfigCli;

#[async_trait]
impl CliHandler for LoggingConfigCli {
    fn description(&self) -> &str {
        "Configures logging"
    }

    fn is_one_shot_compatible(&self) -> bool {
        true
    }

    fn add_arguments(&self, command: Command) -> Command {
        LoggingArgs::augment_args(command)
    }

    async fn handle(&self, app: &dyn Application, matches: &ArgMatches) -> Result<(), CliError> {
        let config = LoggingArgs::from_arg_matches(matches)?.config();
        debug!("Logging configuration: {:?}", config);
        app.accept_configure_logging(config);
        Ok(())
    }
}
