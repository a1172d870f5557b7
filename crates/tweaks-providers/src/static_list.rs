//! Read-only provider built from a declarative tweak list
//!
//! The list is TOML with one `[[tweak]]` table per entry:
//!
//! ```toml
//! [[tweak]]
//! feature = "ui_customization"
//! variable = "display_red_view"
//! title = "Display Red View"
//! group = "UI Customization"
//! value = true
//! displayable = true
//! ```

use std::path::Path;
use std::sync::RwLock;

use serde::Deserialize;
use tweaks_core::{
    ConfigurationProvider, LogLevel, LogSink, Priority, Provider, Tweak, TweakValue, tracing_sink,
};

use crate::error::{Error, Result};
use crate::table::FeatureTable;

#[derive(Debug, Deserialize)]
struct TweakList {
    #[serde(default, rename = "tweak")]
    tweaks: Vec<TweakEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TweakEntry {
    feature: String,
    variable: String,
    title: Option<String>,
    group: Option<String>,
    value: Option<TweakValue>,
    #[serde(default)]
    displayable: bool,
}

impl TweakEntry {
    fn into_tweak(self) -> Tweak {
        let mut tweak = Tweak::new(self.variable).displayable(self.displayable);
        if let Some(title) = self.title {
            tweak = tweak.with_title(title);
        }
        if let Some(group) = self.group {
            tweak = tweak.with_group(group);
        }
        if let Some(value) = self.value {
            tweak = tweak.with_value(value);
        }
        tweak
    }
}

/// Fixed tweaks, typically the application's shipped defaults.
///
/// Never publishes changes since its contents cannot change.
pub struct StaticProvider {
    name: String,
    priority: Priority,
    table: FeatureTable,
    log_sink: RwLock<LogSink>,
}

impl StaticProvider {
    /// Parse a tweak list.
    ///
    /// Entries must name a non-empty feature and variable, and each
    /// (feature, variable) pair may appear only once.
    pub fn from_toml_str(name: impl Into<String>, priority: Priority, content: &str) -> Result<Self> {
        let list: TweakList = toml::from_str(content)?;
        let mut table = FeatureTable::default();

        for entry in list.tweaks {
            if entry.feature.is_empty() || entry.variable.is_empty() {
                return Err(Error::InvalidTweakList {
                    message: format!(
                        "entry with feature {:?} and variable {:?} must name both",
                        entry.feature, entry.variable
                    ),
                });
            }
            let feature = entry.feature.clone();
            if table.get(&feature, &entry.variable).is_some() {
                return Err(Error::DuplicateTweak {
                    feature,
                    variable: entry.variable,
                });
            }
            table.insert(&feature, entry.into_tweak());
        }

        let name = name.into();
        tracing::debug!(provider = %name, tweaks = table.len(), "Parsed tweak list");
        Ok(Self {
            name,
            priority,
            table,
            log_sink: RwLock::new(tracing_sink()),
        })
    }

    /// Load a tweak list from disk.
    pub fn load(name: impl Into<String>, priority: Priority, path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::TweakListNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(name, priority, &content)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wrap in a lookup-only [`Provider`].
    pub fn into_provider(self) -> Provider {
        Provider::plain(self)
    }
}

impl ConfigurationProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn tweak(&self, feature: &str, variable: &str) -> Option<Tweak> {
        let lookup = self.table.lookup(feature, variable);
        if lookup.candidates > 1 {
            let sink = self
                .log_sink
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone();
            sink(
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

impl std::fmt::Debug for StaticProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticProvider")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("tweaks", &self.len())
            .finish()
    }
}
