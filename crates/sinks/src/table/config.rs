//! Table sink runtime configuration

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tablelog_config::{KeyStrategy, MAX_BATCH_SIZE, TableSinkConfig, WriteMode};
use tablelog_protocol::FormatProvider;

use super::entity::{EncoderOptions, EntityEncoder};
use super::keys::{KeyGenerator, key_generator};

/// Default events per transaction
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Default buffer period
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(2);

/// Default destination table
pub const DEFAULT_TABLE_NAME: &str = "LogEventEntity";

/// Configuration for the table sink
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Destination table
    pub table_name: String,

    /// Batched or single-record writes
    pub mode: WriteMode,

    /// Events buffered before a flush (at most [`MAX_BATCH_SIZE`])
    pub batch_size: usize,

    /// Maximum time an event waits in the buffer
    pub period: Duration,

    /// Row/partition key strategy
    pub key_strategy: KeyStrategy,

    /// Suffix appended to every row key
    pub row_key_suffix: Option<String>,

    /// Property names promoted to columns; all when `None`
    pub property_columns: Option<Vec<String>>,

    /// Store the record timestamp converted to UTC
    pub store_timestamp_in_utc: bool,

    /// Continue when the table cannot be created
    pub bypass_table_create_validation: bool,

    /// Rendering settings for messages and textual values
    pub format_provider: FormatProvider,

    /// Whether a metrics handle is offered for reporting
    pub metrics_enabled: bool,

    /// Suggested metrics reporting interval
    pub metrics_interval: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.into(),
            mode: WriteMode::Batched,
            batch_size: DEFAULT_BATCH_SIZE,
            period: DEFAULT_PERIOD,
            key_strategy: KeyStrategy::Default,
            row_key_suffix: None,
            property_columns: None,
            store_timestamp_in_utc: false,
            bypass_table_create_validation: false,
            format_provider: FormatProvider::default(),
            metrics_enabled: true,
            metrics_interval: Duration::from_secs(10),
        }
    }
}

impl From<&TableSinkConfig> for TableConfig {
    fn from(config: &TableSinkConfig) -> Self {
        Self {
            table_name: config.table_name.clone(),
            mode: config.mode,
            batch_size: config.batch_size.clamp(1, MAX_BATCH_SIZE),
            period: config.period,
            key_strategy: config.key_strategy,
            row_key_suffix: config.row_key_suffix.clone(),
            property_columns: config.property_columns.clone(),
            store_timestamp_in_utc: config.store_timestamp_in_utc,
            bypass_table_create_validation: config.bypass_table_create_validation,
            format_provider: FormatProvider::default(),
            metrics_enabled: config.metrics_enabled,
            metrics_interval: config.metrics_interval,
        }
    }
}

impl TableConfig {
    /// Set the destination table
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Set the write mode
    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the batch size, clamped to 1..=[`MAX_BATCH_SIZE`]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    /// Set the buffer period
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Set the key strategy
    pub fn with_key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    /// Set the row key suffix
    pub fn with_row_key_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.row_key_suffix = Some(suffix.into());
        self
    }

    /// Restrict promoted columns to `names`
    pub fn with_property_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_columns = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Store timestamps converted to UTC
    pub fn with_store_timestamp_in_utc(mut self, enabled: bool) -> Self {
        self.store_timestamp_in_utc = enabled;
        self
    }

    /// Continue when the table cannot be created
    pub fn with_bypass_table_create_validation(mut self, bypass: bool) -> Self {
        self.bypass_table_create_validation = bypass;
        self
    }

    /// Set the format provider
    pub fn with_format_provider(mut self, provider: FormatProvider) -> Self {
        self.format_provider = provider;
        self
    }

    /// Enable or disable metrics reporting
    pub fn with_metrics_enabled(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// Key generator for the configured strategy
    pub fn key_generator(&self) -> Arc<dyn KeyGenerator> {
        key_generator(self.key_strategy)
    }

    /// Encoder settings derived from this config
    pub fn encoder_options(&self) -> EncoderOptions {
        EncoderOptions {
            format_provider: self.format_provider.clone(),
            row_key_suffix: self.row_key_suffix.clone(),
            allowed_columns: self
                .property_columns
                .as_ref()
                .map(|names| names.iter().cloned().collect::<HashSet<_>>()),
            store_timestamp_in_utc: self.store_timestamp_in_utc,
        }
    }

    /// Build the encoder for this config
    pub fn build_encoder(&self) -> EntityEncoder {
        EntityEncoder::new(self.encoder_options(), self.key_generator())
    }
}
