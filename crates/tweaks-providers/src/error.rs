//! Error types for tweaks-providers

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Tweak list not found at {path}")]
    TweakListNotFound { path: PathBuf },

    #[error("Invalid tweak list: {message}")]
    InvalidTweakList { message: String },

    #[error("Tweak '{variable}' declared twice in feature '{feature}'")]
    DuplicateTweak { feature: String, variable: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
