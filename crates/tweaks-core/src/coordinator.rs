//! Multi-provider tweak resolution
//!
//! The [`TweaksCoordinator`] owns an ordered list of providers and resolves
//! a (feature, variable) pair by merging what every matching provider
//! knows about it:
//!
//! - `title`, `group` and `value` come from the highest-priority provider
//!   that supplied them; gaps are filled from lower priorities
//! - `can_be_displayed` is true if any matching provider says so
//!
//! Resolutions are memoized until any provider publishes a change on the
//! shared [`ChangeChannel`], at which point the whole cache is dropped.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tweaks_core::{LocalChangeChannel, MainQueue, Provider, TweaksCoordinator};
//!
//! let channel = LocalChangeChannel::shared();
//! let main_queue = Arc::new(MainQueue::new());
//! let coordinator =
//!     TweaksCoordinator::new(vec![Provider::plain(defaults)], channel, main_queue.clone())?;
//! let greet = coordinator.value_for("general", "greet_on_app_did_become_active");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use uuid::Uuid;

use crate::cache::{CachedTweak, ResolutionCache};
use crate::channel::{ChangeChannel, ChannelSubscription, Listener};
use crate::config::CoordinatorConfig;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::logging::{LogLevel, LogSink, tracing_sink};
use crate::provider::{CustomizableConfigurationProvider, Provider};
use crate::tweak::{Tweak, TweakValue};

/// Opaque handle identifying one caller subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(Uuid);

impl SubscriptionToken {
    /// Mint a fresh token, e.g. to pass to
    /// [`TweaksCoordinator::subscribe_with_token`].
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One caller callback attached to the change channel.
///
/// Releasing it detaches the listener and disarms any delivery already
/// queued on the executor.
struct CallerSubscription {
    live: Arc<AtomicBool>,
    _attachment: ChannelSubscription,
}

impl Drop for CallerSubscription {
    fn drop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

/// Resolves tweaks across ranked providers.
///
/// Safe to share between threads. Provider order is fixed at construction.
pub struct TweaksCoordinator {
    providers: Vec<Provider>,
    cache: Arc<Mutex<ResolutionCache>>,
    channel: Arc<dyn ChangeChannel>,
    executor: Arc<dyn Executor>,
    subscriptions: Mutex<HashMap<SubscriptionToken, CallerSubscription>>,
    log_sink: Arc<RwLock<LogSink>>,
    config: CoordinatorConfig,
    _invalidation: ChannelSubscription,
}

impl TweaksCoordinator {
    /// Create a coordinator with the default configuration.
    ///
    /// `executor` is the primary context caller subscriptions are delivered
    /// on. Fails with [`Error::NoProviders`] if `providers` is empty.
    pub fn new(
        providers: Vec<Provider>,
        channel: Arc<dyn ChangeChannel>,
        executor: Arc<dyn Executor>,
    ) -> Result<Self> {
        Self::with_config(providers, channel, executor, CoordinatorConfig::default())
    }

    /// Create a coordinator with an explicit configuration.
    ///
    /// Providers are stably sorted by descending priority, so providers of
    /// equal priority keep the order they were given in. The coordinator
    /// subscribes to `channel` and drops its cache on every publication.
    pub fn with_config(
        mut providers: Vec<Provider>,
        channel: Arc<dyn ChangeChannel>,
        executor: Arc<dyn Executor>,
        config: CoordinatorConfig,
    ) -> Result<Self> {
        if providers.is_empty() {
            return Err(Error::NoProviders);
        }
        providers.sort_by(|a, b| b.priority().cmp(&a.priority()));

        let sink = tracing_sink();
        for provider in &providers {
            provider.set_log_sink(sink.clone());
        }
        let log_sink = Arc::new(RwLock::new(sink));

        let cache = Arc::new(Mutex::new(ResolutionCache::new()));
        let invalidation = channel.subscribe(invalidation_listener(&cache, &log_sink));

        let coordinator = Self {
            providers,
            cache,
            channel,
            executor,
            subscriptions: Mutex::new(HashMap::new()),
            log_sink,
            config,
            _invalidation: invalidation,
        };
        coordinator.log(
            LogLevel::Verbose,
            &format!(
                "Configurations lookup order => [{}]",
                coordinator
                    .providers
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        );
        Ok(coordinator)
    }

    /// Resolve a tweak, consulting the cache first.
    ///
    /// Returns `None` when no provider knows the key; misses are never
    /// cached, so a later call checks every provider again.
    pub fn resolve(&self, feature: &str, variable: &str) -> Option<Tweak> {
        let generation = {
            let cache = self.lock_cache();
            let hit = if self.config.use_cache {
                cache.get(feature, variable).cloned()
            } else {
                None
            };
            if let Some(cached) = hit {
                drop(cache);
                self.log(
                    LogLevel::Verbose,
                    &format!(
                        "Tweak '{}' found in cache (source: {})",
                        cached.tweak, cached.source
                    ),
                );
                return Some(cached.tweak);
            }
            cache.generation()
        };

        let mut resolved: Option<(Tweak, &str)> = None;
        for provider in &self.providers {
            let Some(found) = provider.tweak(feature, variable) else {
                self.log(
                    LogLevel::Verbose,
                    &format!(
                        "Tweak with identifier '{}' NOT found in configuration {}",
                        variable, provider
                    ),
                );
                continue;
            };
            self.log(
                LogLevel::Verbose,
                &format!("Tweak '{}' found in configuration {}", found, provider),
            );
            resolved = Some(match resolved {
                Some((merged, source)) => (merged.merged_with(&found), source),
                None => (Tweak::new(variable).merged_with(&found), provider.name()),
            });
        }

        let Some((tweak, source)) = resolved else {
            self.log(
                LogLevel::Error,
                &format!(
                    "No Tweak found for feature '{}' and identifier '{}'",
                    feature, variable
                ),
            );
            return None;
        };

        self.log(
            LogLevel::Debug,
            &format!(
                "Tweak with feature '{}' and variable '{}' resolved. Using '{}'.",
                feature, variable, tweak
            ),
        );

        if self.config.use_cache {
            let stored = self.lock_cache().insert(
                generation,
                feature,
                variable,
                CachedTweak {
                    tweak: tweak.clone(),
                    source: source.to_string(),
                },
            );
            if !stored {
                self.log(
                    LogLevel::Verbose,
                    &format!(
                        "Configuration changed while resolving '{}'; result not cached",
                        variable
                    ),
                );
            }
        }

        Some(tweak)
    }

    /// The merged value of a tweak, if any provider supplied one.
    pub fn value_for(&self, feature: &str, variable: &str) -> Option<TweakValue> {
        self.resolve(feature, variable)
            .and_then(|tweak| tweak.value().cloned())
    }

    /// The highest-priority provider that can enumerate its variables.
    pub fn top_customizable_provider(&self) -> Option<Arc<dyn CustomizableConfigurationProvider>> {
        self.providers
            .iter()
            .find_map(|provider| provider.as_customizable().cloned())
    }

    /// Every tweak known to the top customizable provider that may be shown
    /// to users.
    ///
    /// Identifiers carry no feature, so each one is resolved under
    /// [`CoordinatorConfig::listing_feature`].
    pub fn list_displayable_tweaks(&self) -> Vec<Tweak> {
        let Some(customizable) = self.top_customizable_provider() else {
            self.log(
                LogLevel::Debug,
                "No customizable configuration available; nothing to list",
            );
            return Vec::new();
        };

        let feature = self.config.listing_feature.as_str();
        customizable
            .all_variable_identifiers()
            .into_iter()
            .filter_map(|identifier| self.resolve(feature, &identifier))
            .filter(Tweak::can_be_displayed)
            .collect()
    }

    /// Register `callback` to run whenever configuration changes.
    ///
    /// Callbacks always run on the executor given at construction, whatever
    /// thread published the change. The cache is already cleared by the time
    /// a callback runs. Returns the token to pass to
    /// [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe_to_changes(
        &self,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> SubscriptionToken {
        let token = SubscriptionToken::new();
        self.subscribe_with_token(token, callback);
        token
    }

    /// Register `callback` under `token`, replacing any subscription
    /// already held under it.
    ///
    /// The previous subscription is torn down before the new one is
    /// installed, so it never fires again, even for a change already
    /// queued on the executor.
    pub fn subscribe_with_token(
        &self,
        token: SubscriptionToken,
        callback: impl Fn() + Send + Sync + 'static,
    ) {
        let callback: Arc<dyn Fn() + Send + Sync> = Arc::new(callback);
        let live = Arc::new(AtomicBool::new(true));
        let executor = self.executor.clone();
        let armed = live.clone();
        let listener: Listener = Arc::new(move || {
            if !armed.load(Ordering::SeqCst) {
                return;
            }
            let callback = callback.clone();
            let armed = armed.clone();
            executor.execute(Box::new(move || {
                if armed.load(Ordering::SeqCst) {
                    callback();
                }
            }));
        });

        let mut subscriptions = self.lock_subscriptions();
        let replaced = subscriptions.remove(&token).is_some();
        let attachment = self.channel.subscribe(listener);
        subscriptions.insert(
            token,
            CallerSubscription {
                live,
                _attachment: attachment,
            },
        );
        drop(subscriptions);

        if replaced {
            self.log(
                LogLevel::Debug,
                &format!("Replaced configuration updates subscription {}", token),
            );
        } else {
            self.log(
                LogLevel::Debug,
                &format!("Registered configuration updates subscription {}", token),
            );
        }
    }

    /// Remove the subscription under `token`.
    ///
    /// Returns false if there was none.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let removed = self.lock_subscriptions().remove(&token);
        match removed {
            Some(subscription) => {
                drop(subscription);
                self.log(
                    LogLevel::Debug,
                    &format!("Deregistered configuration updates subscription {}", token),
                );
                true
            }
            None => false,
        }
    }

    /// Number of live caller subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock_subscriptions().len()
    }

    /// Drop every cached resolution.
    pub fn reset_cache(&self) {
        self.lock_cache().clear();
        self.log(LogLevel::Verbose, "Tweaks cache reset");
    }

    /// Replace the log sink here and on every provider.
    pub fn set_log_sink(&self, sink: LogSink) {
        for provider in &self.providers {
            provider.set_log_sink(sink.clone());
        }
        *self
            .log_sink
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = sink;
    }

    /// Providers in lookup order.
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(Provider::name).collect()
    }

    /// Name of the provider a cached resolution came from.
    pub fn cached_source(&self, feature: &str, variable: &str) -> Option<String> {
        self.lock_cache()
            .get(feature, variable)
            .map(|cached| cached.source.clone())
    }

    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    fn log(&self, level: LogLevel, message: &str) {
        emit(&self.log_sink, level, message);
    }

    fn lock_cache(&self) -> MutexGuard<'_, ResolutionCache> {
        // A poisoned cache is still consistent enough to clear or read.
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_subscriptions(&self) -> MutexGuard<'_, HashMap<SubscriptionToken, CallerSubscription>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for TweaksCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweaksCoordinator")
            .field("providers", &self.providers)
            .field("config", &self.config)
            .field("cached", &self.cache_len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

fn invalidation_listener(
    cache: &Arc<Mutex<ResolutionCache>>,
    log_sink: &Arc<RwLock<LogSink>>,
) -> Listener {
    let cache = cache.clone();
    let log_sink = log_sink.clone();
    Arc::new(move || {
        cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
        emit(
            &log_sink,
            LogLevel::Verbose,
            "Configuration changed; tweaks cache reset",
        );
    })
}

fn emit(log_sink: &RwLock<LogSink>, level: LogLevel, message: &str) {
    // Clone out so the sink never runs under the lock.
    let sink = log_sink
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    sink(level, message);
}
