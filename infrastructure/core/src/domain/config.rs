// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Configuration value objects handed to the application by primary ports.

use serde::{Deserialize, Serialize};

/// Logging switches collected from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub trace: bool,
    pub debug: bool,
    pub info: bool,
    pub quiet: bool,
}

impl LoggingConfig {
    /// Build a config where `quiet` overrides every other switch.
    pub fn resolve(debug: bool, trace: bool, quiet: bool) -> Self {
        if quiet {
            Self {
                trace: false,
                debug: false,
                info: false,
                quiet: true,
            }
        } else {
            Self {
                trace,
                debug,
                info: true,
                quiet: false,
            }
        }
    }
}

/// Event-sourcing settings.
///
/// Serializes to the flat key map the persistence layer reads
/// (`PERSISTENCE_MODULE`, `EVENTSTOREDB_URI`, `EVENTSTOREDB_ROOT_CERTIFICATES`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EventSourcingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_module: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eventstoredb_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub eventstoredb_root_certificates: Option<String>,
}

impl EventSourcingConfig {
    pub fn is_empty(&self) -> bool {
        self.persistence_module.is_none()
            && self.eventstoredb_uri.is_none()
            && self.eventstoredb_root_certificates.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_wins() {
        let config = LoggingConfig::resolve(true, true, true);
        assert_eq!(
            config,
            LoggingConfig {
                trace: false,
                debug: false,
                info: false,
                quiet: true
            }
        );
    }

    #[test]
    fn test_info_is_on_unless_quiet() {
        let config = LoggingConfig::resolve(false, false, false);
        assert!(config.info);
        assert!(!config.quiet);
    }

    #[test]
    fn test_eventsourcing_keys() {
        let config = EventSourcingConfig {
            persistence_module: Some("esdb".to_string()),
            eventstoredb_uri: Some("esdb://localhost:2113".to_string()),
            eventstoredb_root_certificates: None,
        };

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["PERSISTENCE_MODULE"], "esdb");
        assert_eq!(value["EVENTSTOREDB_URI"], "esdb://localhost:2113");
        assert!(value.get("EVENTSTOREDB_ROOT_CERTIFICATES").is_none());
    }
}
