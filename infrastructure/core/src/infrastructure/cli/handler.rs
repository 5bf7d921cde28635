// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! CLI Handler chain
//!
//! Handlers never own a parser. The [`CliDispatcher`] collects their
//! arguments into one `clap::Command`, parses the process arguments once and
//! then calls [`CliHandler::handle`] on every handler, lowest priority first.
//! Arguments that belong to nobody are dropped and parsing resumes, so the
//! handler chain can share a command line with flags it does not know.

use async_trait::async_trait;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use super::one_shot::OneShotArgs;
use crate::domain::ports::{Application, PrimaryPort};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Cannot read file {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File {0} is empty")]
    EmptyFile(PathBuf),

    #[error("Invalid arguments: {0}")]
    Arguments(#[from] clap::Error),

    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

/// One contributor to the shared command line.
#[async_trait]
pub trait CliHandler: Send + Sync {
    fn description(&self) -> &str;

    fn priority(&self) -> i32 {
        0
    }

    /// Whether the handler still makes sense when the application runs once.
    /// Incompatible handlers are skipped when `-1` is given.
    fn is_one_shot_compatible(&self) -> bool {
        false
    }

    /// Single-dash multi-character flags and the long form they stand for.
    fn legacy_flags(&self) -> &[(&'static str, &'static str)] {
        &[]
    }

    fn add_arguments(&self, command: Command) -> Command;

    async fn handle(&self, app: &dyn Application, matches: &ArgMatches) -> Result<(), CliError>;
}

/// Rewrite legacy flags (`-es-p value`, `-es-p=value`) into their long forms.
pub fn normalize_legacy_flags<I, T>(args: I, legacy: &[(&str, &str)]) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            for (short, long) in legacy {
                if text == *short {
                    return OsString::from(*long);
                }
                if let Some(value) = text.strip_prefix(short).and_then(|rest| rest.strip_prefix('=')) {
                    return OsString::from(format!("{}={}", long, value));
                }
            }
            arg
        })
        .collect()
}

pub struct CliDispatcher {
    name: String,
    handlers: Vec<Arc<dyn CliHandler>>,
    handled: AtomicBool,
}

impl CliDispatcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
            handled: AtomicBool::new(false),
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn CliHandler>) -> Self {
        self.handlers.push(handler);
        self.handlers.sort_by_key(|h| h.priority());
        self
    }

    pub fn handlers(&self) -> &[Arc<dyn CliHandler>] {
        &self.handlers
    }

    pub fn is_handled(&self) -> bool {
        self.handled.load(Ordering::SeqCst)
    }

    /// The shared parser with every handler's arguments.
    pub fn command(&self) -> Command {
        let about = self
            .handlers
            .iter()
            .map(|h| h.description())
            .collect::<Vec<_>>()
            .join("; ");

        self.handlers.iter().fold(
            Command::new(self.name.clone()).about(about),
            |command, handler| handler.add_arguments(command),
        )
    }

    /// Parse a full argument vector, program name first.
    pub fn parse<I, T>(&self, args: I) -> Result<ArgMatches, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let legacy: Vec<(&str, &str)> = self
            .handlers
            .iter()
            .flat_map(|h| h.legacy_flags().iter().copied())
            .collect();
        let mut args = normalize_legacy_flags(args, &legacy);
        let command = self.command();

        loop {
            match command.clone().try_get_matches_from(&args) {
                Ok(matches) => return Ok(matches),
                Err(e) if e.kind() == ErrorKind::UnknownArgument => {
                    let Some(ContextValue::String(unknown)) = e.get(ContextKind::InvalidArg) else {
                        return Err(e.into());
                    };
                    if !drop_unknown(&mut args, unknown) {
                        return Err(e.into());
                    }
                    debug!("Ignoring unknown argument {}", unknown);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Handle the process arguments. Returns `false` when already handled.
    pub async fn run(&self, app: &dyn Application) -> Result<bool, CliError> {
        let args: Vec<OsString> = std::env::args_os().collect();
        self.run_with(app, args).await
    }

    /// Handle an explicit argument vector. Only the first call does any work.
    pub async fn run_with<I, T>(&self, app: &dyn Application, args: I) -> Result<bool, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        if self.is_handled() {
            debug!("Command line already handled for {}", app.name());
            return Ok(false);
        }

        let matches = self.parse(args)?;
        self.dispatch(app, &matches).await
    }

    /// Hand already parsed arguments to every handler, once.
    pub async fn dispatch(&self, app: &dyn Application, matches: &ArgMatches) -> Result<bool, CliError> {
        if self.handled.swap(true, Ordering::SeqCst) {
            debug!("Command line already handled for {}", app.name());
            return Ok(false);
        }

        let one_shot = OneShotArgs::requested(matches);
        for handler in &self.handlers {
            if one_shot && !handler.is_one_shot_compatible() {
                debug!("Skipping CLI handler in one-shot mode: {}", handler.description());
                continue;
            }
            debug!("Running CLI handler: {}", handler.description());
            handler.handle(app, matches).await?;
        }

        Ok(true)
    }
}

/// Remove an unknown option, and its value when given as a separate argument.
fn drop_unknown(args: &mut Vec<OsString>, unknown: &str) -> bool {
    let position = args.iter().skip(1).position(|arg| {
        arg.to_str()
            .is_some_and(|text| text == unknown || text.starts_with(&format!("{}=", unknown)))
    });
    let Some(index) = position.map(|p| p + 1) else {
        warn!("Unknown argument {} not found in the command line", unknown);
        return false;
    };

    let inline_value = args[index].to_str().is_some_and(|text| text.contains('='));
    args.remove(index);
    let separate_value = args
        .get(index)
        .and_then(|next| next.to_str())
        .is_some_and(|next| !next.starts_with('-'));
    if !inline_value && separate_value {
        args.remove(index);
    }
    true
}

#[async_trait]
impl PrimaryPort for CliDispatcher {
    fn priority(&self) -> i32 {
        self.handlers.first().map(|h| h.priority()).unwrap_or(0)
    }

    async fn entrypoint(&self, app: Arc<dyn Application>) -> anyhow::Result<()> {
        self.run(app.as_ref()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::Event;
    use crate::infrastructure::cli::one_shot::OneShotCli;
    use crate::testing::RecordingApp;
    use clap::{Arg, ArgAction};
    use std::sync::Mutex;

    struct NamesApp;

    #[async_trait]
    impl Application for NamesApp {
        fn name(&self) -> &str {
            "names"
        }

        async fn accept(&self, _event: Arc<dyn Event>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct NameCli {
        priority: i32,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl CliHandler for NameCli {
        fn description(&self) -> &str {
            "names"
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn legacy_flags(&self) -> &[(&'static str, &'static str)] {
            &[("-nm", "--name")]
        }

        fn add_arguments(&self, command: Command) -> Command {
            if command.get_arguments().any(|a| a.get_id() == "name") {
                return command;
            }
            command.arg(Arg::new("name").long("name").action(ArgAction::Set))
        }

        async fn handle(&self, _app: &dyn Application, matches: &ArgMatches) -> Result<(), CliError> {
            let value = matches.get_one::<String>("name").cloned().unwrap_or_default();
            self.seen.lock().unwrap().push(format!("{}:{}", self.priority, value));
            Ok(())
        }
    }

    fn name_cli(priority: i32, seen: &Arc<Mutex<Vec<String>>>) -> Arc<dyn CliHandler> {
        Arc::new(NameCli {
            priority,
            seen: seen.clone(),
        })
    }

    #[test]
    fn test_normalize_legacy_flags() {
        let legacy = [("-es-p", "--eventsourcing-persistence")];
        let args = normalize_legacy_flags(["app", "-es-p", "esdb", "-es-p=mem", "-q"], &legacy);
        assert_eq!(
            args,
            vec![
                OsString::from("app"),
                OsString::from("--eventsourcing-persistence"),
                OsString::from("esdb"),
                OsString::from("--eventsourcing-persistence=mem"),
                OsString::from("-q"),
            ]
        );
    }

    #[test]
    fn test_unknown_arguments_are_tolerated() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = CliDispatcher::new("app").with_handler(name_cli(0, &seen));
        let matches = dispatcher
            .parse(["app", "--http-port", "8080", "-nm", "acme", "--no-dbus", "--grpc-address=[::1]:1"])
            .unwrap();
        assert_eq!(matches.get_one::<String>("name").map(String::as_str), Some("acme"));
    }

    #[test]
    fn test_drop_unknown_keeps_following_flags() {
        let mut args: Vec<OsString> = ["app", "--port", "1", "--name", "x"].into_iter().map(OsString::from).collect();
        assert!(drop_unknown(&mut args, "--port"));
        assert_eq!(args, vec![OsString::from("app"), OsString::from("--name"), OsString::from("x")]);
        assert!(!drop_unknown(&mut args, "--missing"));
    }

    #[tokio::test]
    async fn test_run_is_idempotent_and_ordered() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = CliDispatcher::new("app")
            .with_handler(name_cli(5, &seen))
            .with_handler(name_cli(1, &seen));

        assert!(dispatcher.run_with(&NamesApp, ["app", "--name", "x"]).await.unwrap());
        assert!(!dispatcher.run_with(&NamesApp, ["app", "--name", "y"]).await.unwrap());

        assert!(dispatcher.is_handled());
        assert_eq!(*seen.lock().unwrap(), vec!["1:x".to_string(), "5:x".to_string()]);
    }

    #[tokio::test]
    async fn test_one_shot_skips_incompatible_handlers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let app = RecordingApp::default();
        let dispatcher = CliDispatcher::new("app")
            .with_handler(name_cli(0, &seen))
            .with_handler(Arc::new(OneShotCli));

        assert!(dispatcher.run_with(&app, ["app", "-1", "--name", "x"]).await.unwrap());

        assert_eq!(app.one_shot(), Some(true));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_incompatible_handlers_run_without_one_shot() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = CliDispatcher::new("app")
            .with_handler(name_cli(0, &seen))
            .with_handler(Arc::new(OneShotCli));

        dispatcher.run_with(&NamesApp, ["app", "--name", "x"]).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["0:x".to_string()]);
    }

    #[test]
    fn test_entrypoint_future_is_send() {
        fn assert_send<T: Send>(_: &T) {}

        let dispatcher = CliDispatcher::new("app");
        let app: Arc<dyn Application> = Arc::new(NamesApp);
        let running = dispatcher.run(app.as_ref());
        assert_send(&running);
        assert_eq!(dispatcher.command().get_name(), "app");
    }
}
