//! Error types
//!
//! Policy decisions never fail; an unknown role simply sees nothing. Errors
//! exist only for loading configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading an [`AuthzConfig`](crate::AuthzConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Config could not be written as TOML
    #[error("Failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Config file is not valid JSON
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Config parsed but holds unusable values
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Build an [`Invalid`](Self::Invalid) error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Errors that can occur while installing the log subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Filter directive could not be parsed
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    Init(String),
}
