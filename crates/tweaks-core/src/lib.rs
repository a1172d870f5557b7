//! Tweak resolution across ranked configuration providers
//!
//! A *tweak* is a named configuration value with optional display metadata.
//! This crate merges tweaks from several pluggable providers, memoizes the
//! result, and drops the memo whenever any provider reports a change.
//!
//! - **Data model**: [`Tweak`], [`TweakValue`], [`Priority`]
//! - **Providers**: [`ConfigurationProvider`] and the enumerating
//!   [`CustomizableConfigurationProvider`], declared through [`Provider`]
//! - **Change notifications**: [`ChangeChannel`] with the in-process
//!   [`LocalChangeChannel`]
//! - **Resolution**: [`TweaksCoordinator`] backed by a [`ResolutionCache`]
//!
//! # Architecture
//!
//! ```text
//!        caller
//!          |
//!   TweaksCoordinator ----subscribes----+
//!     |          |                      |
//!  ResolutionCache   providers ---publish--> ChangeChannel
//! ```

pub mod cache;
pub mod channel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod logging;
pub mod provider;
pub mod tweak;

pub use cache::{CachedTweak, ResolutionCache};
pub use channel::{ChangeChannel, ChannelSubscription, Listener, LocalChangeChannel};
pub use config::CoordinatorConfig;
pub use coordinator::{SubscriptionToken, TweaksCoordinator};
pub use error::{Error, Result};
pub use executor::{Executor, InlineExecutor, MainQueue, Task};
pub use logging::{LogLevel, LogSink, silent_sink, tracing_sink};
pub use provider::{ConfigurationProvider, CustomizableConfigurationProvider, Provider};
pub use tweak::{Priority, Tweak, TweakValue};
