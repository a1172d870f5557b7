//! Tweak providers for the tweaks coordinator.
//!
//! This crate provides concrete [`ConfigurationProvider`](tweaks_core::ConfigurationProvider)
//! implementations:
//!
//! - [`EphemeralProvider`]: mutable, in-memory, enumerable; publishes on change
//! - [`StaticProvider`]: read-only, loaded from a declarative TOML tweak list
//!
//! Both treat an empty feature as "any feature", matching the variable in
//! the lexicographically first feature that defines it.

pub mod ephemeral;
pub mod error;
pub mod static_list;
mod table;

pub use ephemeral::EphemeralProvider;
pub use error::{Error, Result};
pub use static_list::StaticProvider;
