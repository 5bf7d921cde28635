// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use clap::{ArgMatches, Args, Command, FromArgMatches};
use std::path::{Path, PathBuf};

use super::handler::{CliError, CliHandler};
use crate::domain::config::EventSourcingConfig;
use crate::domain::ports::Application;

const LEGACY_FLAGS: &[(&str, &str)] = &[
    ("-es-p", "--eventsourcing-persistence"),
    ("-es-esdb-u", "--eventsourcing-eventstoredb-url"),
    ("-es-esdb-r-c-f", "--eventsourcing-eventstoredb-root-certificates-file"),
];

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct EventsourcingArgs {
    /// The event-sourcing persistence mechanism
    #[arg(long = "eventsourcing-persistence", value_name = "MODULE")]
    pub persistence: Option<String>,

    /// The EventStoreDB url
    #[arg(long = "eventsourcing-eventstoredb-url", value_name = "URL")]
    pub eventstoredb_url: Option<String>,

    /// The file with the EventStoreDB root certificates
    #[arg(long = "eventsourcing-eventstoredb-root-certificates-file", value_name = "FILE")]
    pub eventstoredb_root_certificates_file: Option<PathBuf>,
}

/// Reads event-sourcing settings. A certificates file that cannot be read,
/// or is empty, aborts command-line handling.
#[derive(Debug, Default)]
pub struct EventsourcingConfigCli;

impl EventsourcingConfigCli {
    pub async fn config(args: EventsourcingArgs) -> Result<EventSourcingConfig, CliError> {
        let eventstoredb_root_certificates = match args.eventstoredb_root_certificates_file {
            Some(path) => Some(read_certificates(&path).await?),
            None => None,
        };

        Ok(EventSourcingConfig {
            persistence_module: args.persistence,
            eventstoredb_uri: args.eventstoredb_url,
            eventstoredb_root_certificates,
        })
    }
}

async fn read_certificates(path: &Path) -> Result<String, CliError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::UnreadableFile {
            path: path.to_path_buf(),
            source,
        })?;

    if contents.is_empty() {
        return Err(CliError::EmptyFile(path.to_path_buf()));
    }
    Ok(contents)
}

#[async_trait]
impl CliHandler for EventsourcingConfigCli {
    fn description(&self) -> &str {
        "Configures event-sourcing"
    }

    fn is_one_shot_compatible(&self) -> bool {
        true
    }

    fn legacy_flags(&self) -> &[(&'static str, &'static str)] {
        LEGACY_FLAGS
    }

    fn add_arguments(&self, command: Command) -> Command {
        EventsourcingArgs::augment_args(command)
    }

    async fn handle(&self, app: &dyn Application, matches: &ArgMatches) -> Result<(), CliError> {
        let args = EventsourcingArgs::from_arg_matches(matches)?;
        app.accept_configure_eventsourcing(Self::config(args).await?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cli::handler::CliDispatcher;
    use crate::testing::RecordingApp;
    use std::io::Write;
    use std::sync::Arc;

    fn dispatcher() -> CliDispatcher {
        CliDispatcher::new("app").with_handler(Arc::new(EventsourcingConfigCli))
    }

    #[tokio::test]
    async fn test_legacy_flags_and_certificates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "-----BEGIN CERTIFICATE-----").unwrap();
        let path = file.path().to_string_lossy().to_string();
        let app = RecordingApp::default();

        dispatcher()
            .run_with(&app, ["app", "-es-p", "esdb", "-es-esdb-u=esdb://localhost:2113", "-es-esdb-r-c-f", path.as_str()])
            .await
            .unwrap();

        let config = app.eventsourcing().unwrap();
        assert_eq!(config.persistence_module.as_deref(), Some("esdb"));
        assert_eq!(config.eventstoredb_uri.as_deref(), Some("esdb://localhost:2113"));
        assert_eq!(
            config.eventstoredb_root_certificates.as_deref(),
            Some("-----BEGIN CERTIFICATE-----")
        );
    }

    #[tokio::test]
    async fn test_unreadable_certificates_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pem");
        let app = RecordingApp::default();

        let result = dispatcher()
            .run_with(
                &app,
                ["app", "--eventsourcing-eventstoredb-root-certificates-file", missing.to_str().unwrap()],
            )
            .await;

        assert!(matches!(result, Err(CliError::UnreadableFile { .. })));
        assert!(app.eventsourcing().is_none());
    }

    #[tokio::test]
    async fn test_empty_certificates_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = EventsourcingConfigCli::config(EventsourcingArgs {
            eventstoredb_root_certificates_file: Some(file.path().to_path_buf()),
            ..Default::default()
        })
        .await;

        assert!(matches!(result, Err(CliError::EmptyFile(_))));
    }

    #[tokio::test]
    async fn test_no_flags_yields_empty_config() {
        let app = RecordingApp::default();
        dispatcher().run_with(&app, ["app"]).await.unwrap();
        assert!(app.eventsourcing().unwrap().is_empty());
    }
}
