// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use clap::{ArgMatches, Args, Command, FromArgMatches};

use super::handler::{CliError, CliHandler};
use crate::domain::ports::Application;

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct OneShotArgs {
    /// Process the command line and exit instead of listening
    #[arg(short = '1', long = "one-shot")]
    pub one_shot: bool,
}

impl OneShotArgs {
    /// Whether `-1` was given; `false` when no handler declares the flag.
    pub fn requested(matches: &ArgMatches) -> bool {
        matches
            .try_get_one::<bool>("one_shot")
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false)
    }
}

#[derive(Debug, Default)]
pub struct OneShotCli;

#[async_trait]
impl CliHandler for OneShotCli {
    fn description(&self) -> &str {
        "Run in one-shot mode"
    }

    fn is_one_shot_compatible(&self) -> bool {
        true
    }

    fn add_arguments(&self, command: Command) -> Command {
        OneShotArgs::augment_args(command)
    }

    async fn handle(&self, app: &dyn Application, matches: &ArgMatches) -> Result<(), CliError> {
        let args = OneShotArgs::from_arg_matches(matches)?;
        app.accept_one_shot(args.one_shot);
        Ok(())
    }
}
