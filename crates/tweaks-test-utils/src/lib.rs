//! Shared test utilities for the tweaks workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`provider`]: [`RecordingProvider`], a scripted provider that counts lookups,
//!   and [`LookupJournal`] for query order across providers
//! - [`log`]: [`CapturedLog`], a log sink that records messages

pub mod log;
pub mod provider;

pub use log::CapturedLog;
pub use provider::{LookupJournal, RecordingProvider};
