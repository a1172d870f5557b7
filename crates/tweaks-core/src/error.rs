//! Error types for tweaks-core

use std::path::PathBuf;

/// Result type for tweaks-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tweaks-core operations
///
/// A resolution miss is not an error: lookups return `Option` and the
/// coordinator only logs when no provider knows a key.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A coordinator was constructed without any provider
    #[error("Coordinator requires at least one configuration provider")]
    NoProviders,

    /// Coordinator configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Coordinator configuration is malformed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
