// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Signal catalog
//!
//! Indexes every [`DbusEvent`] adapter by the fully-qualified name of the
//! domain event type it handles. Adapters are contributed by
//! [`SignalPackage`]s; the catalog is built once, on first use, and is
//! read-only afterwards.
//!
//! A package that fails to load is logged and skipped. When two adapters
//! claim the same event type the first registration wins.
//!
//! Adapters are also indexed by signal member name, which is how inbound
//! signals are resolved: a member name does not always spell out the event
//! type it carries.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, warn};

use super::event::DbusEvent;
use super::signal_name::event_type_for_signal;
use super::DbusError;

/// A named group of adapters, typically one per bounded context.
pub trait SignalPackage: Send + Sync {
    fn name(&self) -> &str;

    fn adapters(&self) -> Result<Vec<Arc<dyn DbusEvent>>, DbusError>;
}

/// A package whose adapters are listed up front.
pub struct StaticPackage {
    name: String,
    adapters: Vec<Arc<dyn DbusEvent>>,
}

impl StaticPackage {
    pub fn new(name: impl Into<String>, adapters: Vec<Arc<dyn DbusEvent>>) -> Self {
        Self {
            name: name.into(),
            adapters,
        }
    }
}

impl SignalPackage for StaticPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapters(&self) -> Result<Vec<Arc<dyn DbusEvent>>, DbusError> {
        Ok(self.adapters.clone())
    }
}

#[derive(Default)]
struct Catalog {
    by_event_type: HashMap<String, Arc<dyn DbusEvent>>,
    by_signal: HashMap<String, Arc<dyn DbusEvent>>,
}

pub struct DbusSignals {
    packages: Vec<Arc<dyn SignalPackage>>,
    catalog: OnceLock<Catalog>,
}

impl DbusSignals {
    pub fn new(packages: Vec<Arc<dyn SignalPackage>>) -> Self {
        Self {
            packages,
            catalog: OnceLock::new(),
        }
    }

    /// Catalog over a single package of adapters.
    pub fn with_adapters(package: impl Into<String>, adapters: Vec<Arc<dyn DbusEvent>>) -> Self {
        Self::new(vec![Arc::new(StaticPackage::new(package, adapters))])
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(|p| p.name())
    }

    /// Adapters keyed by event type, built on first call.
    pub fn signals(&self) -> &HashMap<String, Arc<dyn DbusEvent>> {
        &self.catalog().by_event_type
    }

    fn catalog(&self) -> &Catalog {
        self.catalog.get_or_init(|| self.build())
    }

    pub fn get(&self, event_type: &str) -> Option<&Arc<dyn DbusEvent>> {
        self.signals().get(event_type)
    }

    /// Resolve the adapter sending the given signal member.
    pub fn find_by_signal(&self, signal: &str) -> Option<&Arc<dyn DbusEvent>> {
        self.catalog().by_signal.get(signal)
    }

    pub fn len(&self) -> usize {
        self.signals().len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals().is_empty()
    }

    fn build(&self) -> Catalog {
        let mut result = Catalog::default();

        for package in &self.packages {
            let adapters = match package.adapters() {
                Ok(adapters) => adapters,
                Err(e) => {
                    error!("Could not load signal package '{}': {}", package.name(), e);
                    continue;
                }
            };

            for adapter in adapters {
                let key = adapter.event_type().to_string();
                if let Some(existing) = result.by_event_type.get(&key) {
                    warn!(
                        "Ignoring adapter {} for {}: already handled by {}",
                        adapter.interface(),
                        key,
                        existing.interface()
                    );
                    continue;
                }
                if let Some(existing) = result.by_signal.get(adapter.name()) {
                    warn!(
                        "Ignoring adapter {} for {}: signal {} already sent by {}",
                        adapter.interface(),
                        key,
                        adapter.name(),
                        existing.interface()
                    );
                    continue;
                }
                if event_type_for_signal(adapter.name()).as_deref() != Some(key.as_str()) {
                    debug!(
                        "Signal {} of adapter {} does not spell out its event type {}",
                        adapter.name(),
                        adapter.interface(),
                        key
                    );
                }
                debug!("Registered d-bus adapter {} for {}", adapter.interface(), key);
                result.by_signal.insert(adapter.name().to_string(), adapter.clone());
                result.by_event_type.insert(key, adapter);
            }
        }

        result
    }
}
