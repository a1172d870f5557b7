//! Coordinator configuration
//!
//! Loaded from TOML, for example:
//!
//! ```toml
//! use_cache = true
//! listing_feature = ""
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Behavior switches for a [`TweaksCoordinator`](crate::TweaksCoordinator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Memoize resolutions until the next change event.
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,

    /// Feature key passed to providers when listing displayable tweaks.
    ///
    /// Providers receive this instead of a real feature, so it should be a
    /// key they treat as "any feature". The empty string is the default.
    #[serde(default)]
    pub listing_feature: String,
}

fn default_use_cache() -> bool {
    true
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            use_cache: default_use_cache(),
            listing_feature: String::new(),
        }
    }
}

impl CoordinatorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(?path, use_cache = config.use_cache, "Loaded coordinator config");
        Ok(config)
    }

    /// Disable or enable memoization.
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Use `feature` as the key for displayable-tweak listing.
    pub fn with_listing_feature(mut self, feature: impl Into<String>) -> Result<Self> {
        let feature = feature.into();
        if feature.chars().any(char::is_control) {
            return Err(Error::InvalidConfig {
                message: format!("listing feature {:?} contains control characters", feature),
            });
        }
        self.listing_feature = feature;
        Ok(self)
    }
}
