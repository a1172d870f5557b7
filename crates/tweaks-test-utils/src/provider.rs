//! [`RecordingProvider`] for coordinator test scenarios.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use tweaks_core::{
    ChangeChannel, ConfigurationProvider, CustomizableConfigurationProvider, LogSink, Priority,
    Provider, Tweak,
};

/// Lookup order shared across several [`RecordingProvider`]s.
///
/// Each provider attached with [`RecordingProvider::with_journal`] appends
/// its name on every lookup, so a test can see the order the coordinator
/// walked its providers in.
#[derive(Clone, Default)]
pub struct LookupJournal {
    names: Arc<Mutex<Vec<String>>>,
}

impl LookupJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider names in the order they were queried.
    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.names.lock().unwrap().clear();
    }

    fn record(&self, name: &str) {
        self.names.lock().unwrap().push(name.to_string());
    }
}

/// A provider answering from a fixed table and recording every lookup.
///
/// Clones share the same table and lookup log, so a test can hand one
/// clone to the coordinator and keep another for assertions.
///
/// # Example
///
/// ```rust
/// use tweaks_core::Tweak;
/// use tweaks_test_utils::RecordingProvider;
///
/// let provider = RecordingProvider::new("remote", 10)
///     .with_tweak("ui", Tweak::new("dark_mode").with_value(true));
/// assert_eq!(provider.lookup_count(), 0);
/// ```
#[derive(Clone)]
pub struct RecordingProvider {
    name: String,
    priority: Priority,
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    tweaks: BTreeMap<(String, String), Tweak>,
    lookups: Vec<(String, String)>,
    sink_updates: usize,
    channel: Option<Arc<dyn ChangeChannel>>,
    journal: Option<LookupJournal>,
}

impl RecordingProvider {
    pub fn new(name: &str, priority: u16) -> Self {
        Self {
            name: name.to_string(),
            priority: Priority(priority),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Add a tweak under `feature`, keyed by the tweak's identifier.
    pub fn with_tweak(self, feature: &str, tweak: Tweak) -> Self {
        self.state().tweaks.insert(
            (feature.to_string(), tweak.identifier().to_string()),
            tweak,
        );
        self
    }

    /// Publish on `channel` from [`set`](Self::set).
    pub fn with_channel(self, channel: Arc<dyn ChangeChannel>) -> Self {
        self.state().channel = Some(channel);
        self
    }

    /// Append this provider's name to `journal` on every lookup.
    pub fn with_journal(self, journal: &LookupJournal) -> Self {
        self.state().journal = Some(journal.clone());
        self
    }

    /// Replace or add a tweak and publish a change if a channel is attached.
    pub fn set(&self, feature: &str, tweak: Tweak) {
        let channel = {
            let mut state = self.state();
            state.tweaks.insert(
                (feature.to_string(), tweak.identifier().to_string()),
                tweak,
            );
            state.channel.clone()
        };
        if let Some(channel) = channel {
            channel.publish();
        }
    }

    /// Wrap a clone as a lookup-only provider.
    pub fn plain(&self) -> Provider {
        Provider::plain(self.clone())
    }

    /// Wrap a clone as an enumerating provider.
    pub fn customizable(&self) -> Provider {
        Provider::customizable(self.clone())
    }

    /// Every (feature, variable) this provider was asked for, in order.
    pub fn lookups(&self) -> Vec<(String, String)> {
        self.state().lookups.clone()
    }

    pub fn lookup_count(&self) -> usize {
        self.state().lookups.len()
    }

    pub fn reset_lookups(&self) {
        self.state().lookups.clear();
    }

    /// How many times a log sink was installed on this provider.
    pub fn sink_updates(&self) -> usize {
        self.state().sink_updates
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }
}

impl ConfigurationProvider for RecordingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn tweak(&self, feature: &str, variable: &str) -> Option<Tweak> {
        let mut state = self.state();
        if let Some(journal) = &state.journal {
            journal.record(&self.name);
        }
        state
            .lookups
            .push((feature.to_string(), variable.to_string()));
        state
            .tweaks
            .get(&(feature.to_string(), variable.to_string()))
            .cloned()
    }

    fn set_log_sink(&self, _sink: LogSink) {
        self.state().sink_updates += 1;
    }
}

impl CustomizableConfigurationProvider for RecordingProvider {
    fn all_variable_identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self
            .state()
            .tweaks
            .keys()
            .map(|(_, variable)| variable.clone())
            .collect();
        identifiers.sort();
        identifiers.dedup();
        identifiers
    }
}
