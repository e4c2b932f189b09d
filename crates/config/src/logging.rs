//! Logging configuration
//!
//! Controls the diagnostic output of the table sink itself, not the events
//! it stores.

use std::fs::OpenOptions;
use std::sync::Mutex;

use serde::Deserialize;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::error::{ConfigError, Result};

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - very verbose
    Trace,
    /// Debug level - debugging information
    Debug,
    /// Info level - normal operation (default)
    #[default]
    Info,
    /// Warn level - warnings only
    Warn,
    /// Error level - errors only
    Error,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output (default)
    #[default]
    Console,
    /// JSON structured logging
    Json,
}

/// Log output destination
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Write to stdout (default)
    #[default]
    Stdout,
    /// Write to stderr
    Stderr,
    /// Append to a file
    #[serde(untagged)]
    File(String),
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "info"
/// format = "console"
/// output = "stdout"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Default: info
    pub level: LogLevel,

    /// Output format (console, json)
    /// Default: console
    pub format: LogFormat,

    /// Output destination (stdout, stderr, or file path)
    /// Default: stdout
    pub output: LogOutput,
}

impl LogConfig {
    /// Build the writer for the configured destination
    fn make_writer(&self) -> Result<BoxMakeWriter> {
        Ok(match &self.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| ConfigError::OpenLogFile {
                        path: path.clone(),
                        source: e,
                    })?;
                BoxMakeWriter::new(Mutex::new(file))
            }
        })
    }
}

/// Install the global tracing subscriber
///
/// `override_level` (e.g. from a CLI flag) wins over the configured level.
///
/// # Errors
///
/// Fails if the level filter is invalid, the log file cannot be opened, or a
/// global subscriber is already installed.
pub fn init_tracing(config: &LogConfig, override_level: Option<&str>) -> Result<()> {
    let level = override_level.unwrap_or(config.level.as_str());
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| ConfigError::Subscriber(format!("invalid log level: {e}")))?;

    let writer = config.make_writer()?;
    let layer = match config.format {
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| ConfigError::Subscriber(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Console);
        assert_eq!(config.output, LogOutput::Stdout);
    }

    #[test]
    fn test_deserialize_empty() {
        let config: LogConfig = toml::from_str("").unwrap();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Console);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
level = "debug"
format = "json"
output = "stderr"
"#;
        let config: LogConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stderr);
    }

    #[test]
    fn test_deserialize_file_output() {
        let config: LogConfig = toml::from_str(r#"output = "/var/log/tablelog.log""#).unwrap();
        assert_eq!(config.output, LogOutput::File("/var/log/tablelog.log".into()));
    }

    #[test]
    fn test_level_as_str() {
        assert_eq!(LogLevel::Trace.as_str(), "trace");
        assert_eq!(LogLevel::Debug.as_str(), "debug");
        assert_eq!(LogLevel::Info.as_str(), "info");
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::Error.as_str(), "error");
    }

    #[test]
    fn test_file_writer_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sink.log");
        let config = LogConfig {
            output: LogOutput::File(path.display().to_string()),
            ..Default::default()
        };

        assert!(config.make_writer().is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_init_tracing_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            format: LogFormat::Json,
            output: LogOutput::File(dir.path().join("init.log").display().to_string()),
            ..Default::default()
        };

        assert!(init_tracing(&config, Some("debug")).is_ok());
        assert!(matches!(
            init_tracing(&config, None),
            Err(ConfigError::Subscriber(_))
        ));
    }

    #[test]
    fn test_file_writer_bad_path() {
        let config = LogConfig {
            output: LogOutput::File("/nonexistent-dir/for/sure/sink.log".into()),
            ..Default::default()
        };
        assert!(matches!(config.make_writer(), Err(ConfigError::OpenLogFile { .. })));
    }
}
