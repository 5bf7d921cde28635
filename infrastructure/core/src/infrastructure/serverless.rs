// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Serverless bootstrap
//!
//! Function hosts start the process without a command line. When
//! `PYTHONEDA_ENABLE_AZURE_FUNCTIONS` is set, the application named by
//! `PYTHONEDA_APP_FOR_AZURE_FUNCTIONS` is looked up in an [`AppFactories`]
//! table, launched on first use and shared for the rest of the process.

use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::domain::ports::Application;

pub const ENABLE_SERVERLESS_VAR: &str = "PYTHONEDA_ENABLE_AZURE_FUNCTIONS";
pub const SERVERLESS_APP_VAR: &str = "PYTHONEDA_APP_FOR_AZURE_FUNCTIONS";

#[derive(Debug, thiserror::Error)]
pub enum ServerlessError {
    #[error("Serverless bootstrap is disabled (PYTHONEDA_ENABLE_AZURE_FUNCTIONS is not set)")]
    Disabled,

    #[error("PYTHONEDA_APP_FOR_AZURE_FUNCTIONS is not set")]
    MissingApp,

    #[error("No application registered as '{0}'")]
    UnknownApp(String),

    #[error("Failed to launch application '{name}': {source}")]
    Launch {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type AppFactory = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Arc<dyn Application>>> + Send + Sync>;

/// Application entry points by name.
#[derive(Default, Clone)]
pub struct AppFactories {
    factories: HashMap<String, AppFactory>,
}

impl AppFactories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, anyhow::Result<Arc<dyn Application>>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn get(&self, name: &str) -> Option<&AppFactory> {
        self.factories.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerlessSettings {
    pub enabled: bool,
    pub app: Option<String>,
}

impl ServerlessSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The bootstrap is enabled by the variable's presence, whatever its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            enabled: lookup(ENABLE_SERVERLESS_VAR).is_some(),
            app: lookup(SERVERLESS_APP_VAR).filter(|name| !name.is_empty()),
        }
    }
}

pub struct ServerlessBootstrap {
    settings: ServerlessSettings,
    factories: AppFactories,
    app: OnceCell<Arc<dyn Application>>,
}

impl ServerlessBootstrap {
    pub fn new(settings: ServerlessSettings, factories: AppFactories) -> Self {
        Self {
            settings,
            factories,
            app: OnceCell::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// The shared application, launching it on the first call.
    pub async fn app(&self) -> Result<Arc<dyn Application>, ServerlessError> {
        if !self.settings.enabled {
            return Err(ServerlessError::Disabled);
        }
        let name = self.settings.app.as_deref().ok_or(ServerlessError::MissingApp)?;

        self.app
            .get_or_try_init(|| async {
                let factory = self
                    .factories
                    .get(name)
                    .ok_or_else(|| ServerlessError::UnknownApp(name.to_string()))?;
                let app = factory().await.map_err(|source| ServerlessError::Launch {
                    name: name.to_string(),
                    source,
                })?;
                info!("Launched {} for serverless invocations", app.name());
                Ok::<_, ServerlessError>(app)
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingApp;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn settings(enabled: bool, app: Option<&str>) -> ServerlessSettings {
        ServerlessSettings {
            enabled,
            app: app.map(str::to_string),
        }
    }

    fn counting_factories(launches: Arc<AtomicUsize>) -> AppFactories {
        AppFactories::new().register("acme.Orders", move || {
            launches.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, anyhow::Error>(Arc::new(RecordingApp::default()) as Arc<dyn Application>) }.boxed()
        })
    }

    #[test]
    fn test_settings_from_lookup() {
        let enabled = ServerlessSettings::from_lookup(|key| match key {
            ENABLE_SERVERLESS_VAR => Some(String::new()),
            SERVERLESS_APP_VAR => Some("acme.Orders".to_string()),
            _ => None,
        });
        assert_eq!(enabled, settings(true, Some("acme.Orders")));

        assert_eq!(ServerlessSettings::from_lookup(|_| None), settings(false, None));
    }

    #[tokio::test]
    async fn test_app_is_launched_once() {
        let launches = Arc::new(AtomicUsize::new(0));
        let bootstrap = ServerlessBootstrap::new(settings(true, Some("acme.Orders")), counting_factories(launches.clone()));

        let first = bootstrap.app().await.unwrap();
        let second = bootstrap.app().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors() {
        let launches = Arc::new(AtomicUsize::new(0));

        let disabled = ServerlessBootstrap::new(settings(false, Some("acme.Orders")), counting_factories(launches.clone()));
        assert!(matches!(disabled.app().await, Err(ServerlessError::Disabled)));

        let missing = ServerlessBootstrap::new(settings(true, None), counting_factories(launches.clone()));
        assert!(matches!(missing.app().await, Err(ServerlessError::MissingApp)));

        let unknown = ServerlessBootstrap::new(settings(true, Some("acme.Billing")), counting_factories(launches.clone()));
        assert!(matches!(unknown.app().await, Err(ServerlessError::UnknownApp(name)) if name == "acme.Billing"));

        let failing = ServerlessBootstrap::new(
            settings(true, Some("broken")),
            AppFactories::new().register("broken", || async { Err::<Arc<dyn Application>, _>(anyhow::anyhow!("boom")) }.boxed()),
        );
        assert!(matches!(failing.app().await, Err(ServerlessError::Launch { .. })));

        assert_eq!(launches.load(Ordering::SeqCst), 0);
    }
}
