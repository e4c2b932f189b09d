//! Configuration error types
//!
//! Setting errors name the TOML section and key they came from, so a message
//! such as `[sink] batch_size must be between 1 and 100, got 0` points straight
//! at the line to fix.

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading the config file or setting up logging
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("cannot read config file '{path}'")]
    ReadFile {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML or does not match the config layout
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required setting is absent or blank
    #[error("[{section}] {key} is required")]
    MissingSetting {
        /// TOML section, e.g. `sink`
        section: &'static str,
        key: &'static str,
    },

    /// A setting is present but out of range or malformed
    #[error("[{section}] {key} {reason}")]
    InvalidSetting {
        section: &'static str,
        key: &'static str,
        /// Completes the sentence after the key name
        reason: String,
    },

    /// The `[log]` output file could not be opened for appending
    #[error("cannot open log file '{path}'")]
    OpenLogFile {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The tracing subscriber could not be installed
    #[error("cannot install tracing subscriber: {0}")]
    Subscriber(String),
}

impl ConfigError {
    pub fn missing(section: &'static str, key: &'static str) -> Self {
        Self::MissingSetting { section, key }
    }

    pub fn invalid(section: &'static str, key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            section,
            key,
            reason: reason.into(),
        }
    }
}
