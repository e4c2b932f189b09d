//! Tablelog Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid configuration.
//!
//! # Parsing
//!
//! ```
//! use tablelog_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[sink]\ntable_name = \"AppLogs\"").unwrap();
//! assert_eq!(config.sink.table_name, "AppLogs");
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//! format = "json"
//!
//! [sink]
//! table_name = "LogEventEntity"
//! mode = "batched"
//! batch_size = 50
//! period = "2s"
//! key_strategy = "default"
//! property_columns = ["RequestId"]
//! ```

mod error;
mod logging;
mod sinks;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput, init_tracing};
pub use sinks::{KeyStrategy, MAX_BATCH_SIZE, TableSinkConfig, WriteMode};
pub use validation::MAX_ROW_KEY_SUFFIX_LEN;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Table sink configuration
    pub sink: TableSinkConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.log.level, LogLevel::Info);
        assert_eq!(config.sink.table_name, "LogEventEntity");
        assert_eq!(config.sink.batch_size, 50);
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[log]
level = "debug"
format = "json"

[sink]
table_name = "AppLogs"
batch_size = 25
period = "5s"
key_strategy = "properties"
"#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.sink.table_name, "AppLogs");
        assert_eq!(config.sink.batch_size, 25);
        assert_eq!(config.sink.period, Duration::from_secs(5));
        assert_eq!(config.sink.key_strategy, KeyStrategy::Properties);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_str("[sink\nbatch_size = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sink]\ntable_name = \"FromFile\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.sink.table_name, "FromFile");
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
