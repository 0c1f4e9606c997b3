//! Error types for the fallible edges of the core: configuration loading
//! and audio device setup. The numeric pipeline itself never fails; it
//! degrades to "no pitch" or "no value" instead.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised outside the numeric pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::config::AnalysisConfig`].
    #[error("failed to parse config: {0}")]
    ParseConfig(#[from] toml::de::Error),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The audio input device could not be opened or started.
    #[error("audio device error: {0}")]
    Device(String),
}

impl Error {
    pub fn read_config(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::ReadConfig {
            path: path.into(),
            source,
        }
    }
}
