//! In-memory, mutable tweak provider

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tweaks_core::{
    ChangeChannel, ConfigurationProvider, CustomizableConfigurationProvider, LogLevel, LogSink,
    Priority, Provider, Tweak, TweakValue, tracing_sink,
};

use crate::table::FeatureTable;

/// A provider holding tweaks in memory for the lifetime of the process.
///
/// Every mutation publishes on the injected channel, so coordinators
/// sharing that channel drop their caches. It can enumerate its variables,
/// which makes it suitable as the top customizable provider for an
/// in-app tweak editor.
pub struct EphemeralProvider {
    name: String,
    priority: Priority,
    channel: Arc<dyn ChangeChannel>,
    table: RwLock<FeatureTable>,
    log_sink: RwLock<LogSink>,
}

impl EphemeralProvider {
    pub fn new(name: impl Into<String>, priority: Priority, channel: Arc<dyn ChangeChannel>) -> Self {
        Self {
            name: name.into(),
            priority,
            channel,
            table: RwLock::new(FeatureTable::default()),
            log_sink: RwLock::new(tracing_sink()),
        }
    }

    /// Seed a tweak without publishing. Intended for construction.
    pub fn with_tweak(self, feature: &str, tweak: Tweak) -> Self {
        self.write_table().insert(feature, tweak);
        self
    }

    /// Store `tweak` under `feature` and publish a change.
    pub fn set(&self, feature: &str, tweak: Tweak) {
        let message = format!("{}: set '{}' in feature '{}'", self.name, tweak, feature);
        self.write_table().insert(feature, tweak);
        self.log(LogLevel::Debug, &message);
        self.channel.publish();
    }

    /// Update only the value of a tweak, keeping any existing metadata.
    pub fn set_value(&self, feature: &str, variable: &str, value: impl Into<TweakValue>) {
        let value = value.into();
        let tweak = {
            let mut table = self.write_table();
            let tweak = table
                .get(feature, variable)
                .cloned()
                .unwrap_or_else(|| Tweak::new(variable))
                .with_value(value);
            table.insert(feature, tweak.clone());
            tweak
        };
        self.log(
            LogLevel::Debug,
            &format!("{}: set '{}' in feature '{}'", self.name, tweak, feature),
        );
        self.channel.publish();
    }

    /// Remove a tweak. Publishes only if something was removed.
    pub fn remove(&self, feature: &str, variable: &str) -> Option<Tweak> {
        let removed = self.write_table().remove(feature, variable);
        if removed.is_some() {
            self.log(
                LogLevel::Debug,
                &format!("{}: removed '{}' from feature '{}'", self.name, variable, feature),
            );
            self.channel.publish();
        }
        removed
    }

    /// Remove every tweak. Publishes only if the provider was not empty.
    pub fn clear(&self) {
        if self.write_table().clear() {
            self.log(LogLevel::Debug, &format!("{}: cleared", self.name));
            self.channel.publish();
        }
    }

    pub fn len(&self) -> usize {
        self.read_table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wrap in a [`Provider`] declaring the enumeration capability.
    pub fn into_provider(self) -> Provider {
        Provider::customizable(self)
    }

    fn log(&self, level: LogLevel, message: &str) {
        let sink = self
            .log_sink
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        sink(level, message);
    }

    fn read_table(&self) -> RwLockReadGuard<'_, FeatureTable> {
        self.table
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, FeatureTable> {
        self.table
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConfigurationProvider for EphemeralProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn tweak(&self, feature: &str, variable: &str) -> Option<Tweak> {
        let lookup = self.read_table().lookup(feature, variable);
        if lookup.candidates > 1 {
            self.log(
                LogLevel::Debug,
                &format!(
                    "{}: '{}' exists in {} features; using the first",
                    self.name, variable, lookup.candidates
                ),
            );
        }
        lookup.tweak
    }

    fn set_log_sink(&self, sink: LogSink) {
        *self
            .log_sink
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = sink;
    }
}

impl CustomizableConfigurationProvider for EphemeralProvider {
    fn all_variable_identifiers(&self) -> Vec<String> {
        self.read_table().variable_identifiers()
    }
}

impl std::fmt::Debug for EphemeralProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralProvider")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("tweaks", &self.len())
            .finish()
    }
}
