//! Configuration provider capabilities
//!
//! A provider is a ranked source of tweaks. Providers that can also list
//! every variable they know implement [`CustomizableConfigurationProvider`].
//! The capability is declared up front by wrapping the provider in the
//! matching [`Provider`] variant, so the coordinator never has to probe a
//! provider at runtime.

use std::fmt;
use std::sync::Arc;

use crate::logging::LogSink;
use crate::tweak::{Priority, Tweak};

/// A ranked source answering per-key lookups.
///
/// Implementations publish on their injected
/// [`ChangeChannel`](crate::ChangeChannel) whenever their data changes.
/// A provider that fails internally (malformed store, I/O) answers `None`.
pub trait ConfigurationProvider: Send + Sync {
    /// Label used in diagnostics and as the cached source of a resolution.
    fn name(&self) -> &str;

    /// Rank; higher is consulted first.
    fn priority(&self) -> Priority;

    /// Look up a single tweak.
    fn tweak(&self, feature: &str, variable: &str) -> Option<Tweak>;

    /// Replace the sink this provider logs through.
    fn set_log_sink(&self, _sink: LogSink) {}
}

/// A provider that can enumerate every variable it knows about.
pub trait CustomizableConfigurationProvider: ConfigurationProvider {
    fn all_variable_identifiers(&self) -> Vec<String>;
}

/// A provider together with its declared capability set.
#[derive(Clone)]
pub enum Provider {
    /// Lookup only.
    Plain(Arc<dyn ConfigurationProvider>),
    /// Lookup plus enumeration.
    Customizable(Arc<dyn CustomizableConfigurationProvider>),
}

impl Provider {
    pub fn plain(provider: impl ConfigurationProvider + 'static) -> Self {
        Provider::Plain(Arc::new(provider))
    }

    pub fn customizable(provider: impl CustomizableConfigurationProvider + 'static) -> Self {
        Provider::Customizable(Arc::new(provider))
    }

    pub fn name(&self) -> &str {
        match self {
            Provider::Plain(p) => p.name(),
            Provider::Customizable(p) => p.name(),
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            Provider::Plain(p) => p.priority(),
            Provider::Customizable(p) => p.priority(),
        }
    }

    pub fn tweak(&self, feature: &str, variable: &str) -> Option<Tweak> {
        match self {
            Provider::Plain(p) => p.tweak(feature, variable),
            Provider::Customizable(p) => p.tweak(feature, variable),
        }
    }

    pub fn set_log_sink(&self, sink: LogSink) {
        match self {
            Provider::Plain(p) => p.set_log_sink(sink),
            Provider::Customizable(p) => p.set_log_sink(sink),
        }
    }

    /// The enumeration capability, if this provider declared it.
    pub fn as_customizable(&self) -> Option<&Arc<dyn CustomizableConfigurationProvider>> {
        match self {
            Provider::Plain(_) => None,
            Provider::Customizable(p) => Some(p),
        }
    }

    pub fn is_customizable(&self) -> bool {
        matches!(self, Provider::Customizable(_))
    }
}

impl From<Arc<dyn ConfigurationProvider>> for Provider {
    fn from(provider: Arc<dyn ConfigurationProvider>) -> Self {
        Provider::Plain(provider)
    }
}

impl From<Arc<dyn CustomizableConfigurationProvider>> for Provider {
    fn from(provider: Arc<dyn CustomizableConfigurationProvider>) -> Self {
        Provider::Customizable(provider)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name())
            .field("priority", &self.priority())
            .field("customizable", &self.is_customizable())
            .finish()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.priority())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl ConfigurationProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn priority(&self) -> Priority {
            Priority::LOW
        }

        fn tweak(&self, _feature: &str, variable: &str) -> Option<Tweak> {
            (variable == "known").then(|| Tweak::new(variable).with_value(1))
        }
    }

    impl CustomizableConfigurationProvider for Fixed {
        fn all_variable_identifiers(&self) -> Vec<String> {
            vec!["known".to_string()]
        }
    }

    #[test]
    fn test_plain_has_no_enumeration() {
        let provider = Provider::plain(Fixed);
        assert!(!provider.is_customizable());
        assert!(provider.as_customizable().is_none());
        assert_eq!(provider.name(), "fixed");
    }

    #[test]
    fn test_customizable_exposes_enumeration() {
        let provider = Provider::customizable(Fixed);
        let customizable = provider.as_customizable().unwrap();
        assert_eq!(customizable.all_variable_identifiers(), vec!["known"]);
    }

    #[test]
    fn test_lookup_delegates() {
        let provider = Provider::customizable(Fixed);
        assert!(provider.tweak("f", "known").is_some());
        assert!(provider.tweak("f", "unknown").is_none());
        assert_eq!(provider.to_string(), "fixed (p3)");
    }
}
