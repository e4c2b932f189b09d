//! Table sink configuration
//!
//! Controls how log events are encoded and batched into the table store.

use serde::Deserialize;
use std::time::Duration;

/// Upper bound the store places on one transaction
pub const MAX_BATCH_SIZE: usize = 100;

/// How events reach the store
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Buffer events and submit partition-grouped transactions (default)
    #[default]
    Batched,
    /// Upsert every event on its own as it arrives
    Single,
}

/// Row/partition key strategy
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// Time-bucketed partition, time-ordered row key (default)
    #[default]
    Default,
    /// Time-bucketed partition, `Level|Template|suffix|token` row key
    Properties,
}

impl KeyStrategy {
    /// Config name of the strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Properties => "properties",
        }
    }
}

/// Table sink configuration
///
/// # Example
///
/// ```toml
/// [sink]
/// table_name = "LogEventEntity"
/// batch_size = 50
/// period = "2s"
/// key_strategy = "properties"
/// row_key_suffix = "web-01"
/// property_columns = ["RequestId", "UserId"]
/// bypass_table_create_validation = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableSinkConfig {
    /// Whether the sink is enabled
    /// Default: true
    pub enabled: bool,

    /// Destination table
    /// Default: LogEventEntity
    pub table_name: String,

    /// Batched or single-record writes
    /// Default: batched
    pub mode: WriteMode,

    /// Events buffered before a flush (1-100)
    /// Default: 50
    pub batch_size: usize,

    /// Maximum time an event waits in the buffer
    /// Default: 2s
    #[serde(with = "humantime_serde")]
    pub period: Duration,

    /// Channel capacity in front of the sink
    /// Default: 10000
    pub queue_size: usize,

    /// Key generation strategy
    /// Default: default
    pub key_strategy: KeyStrategy,

    /// Optional suffix appended to every row key
    pub row_key_suffix: Option<String>,

    /// Allow-list of property names promoted to columns (all when unset)
    pub property_columns: Option<Vec<String>>,

    /// Store the record timestamp converted to UTC
    /// Default: false
    pub store_timestamp_in_utc: bool,

    /// Continue when the table cannot be created
    /// Default: false
    pub bypass_table_create_validation: bool,

    /// Enable sink metrics reporting
    /// Default: true
    pub metrics_enabled: bool,

    /// Metrics reporting interval
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub metrics_interval: Duration,
}

impl Default for TableSinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            table_name: "LogEventEntity".into(),
            mode: WriteMode::Batched,
            batch_size: 50,
            period: Duration::from_secs(2),
            queue_size: 10_000,
            key_strategy: KeyStrategy::Default,
            row_key_suffix: None,
            property_columns: None,
            store_timestamp_in_utc: false,
            bypass_table_create_validation: false,
            metrics_enabled: true,
            metrics_interval: Duration::from_secs(10),
        }
    }
}
