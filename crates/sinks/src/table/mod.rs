//! Table Sink - Key/Value Table Store
//!
//! Encodes structured log events into flat entities and writes them to a
//! table store with hard limits: 252 data columns per entity, 64 KiB per
//! string column, 1 KiB per key, 100 actions per transaction, and one
//! partition per transaction.
//!
//! # Pipeline
//!
//! - **Keys**: a [`KeyGenerator`] derives a minute-bucketed partition key and
//!   a unique row key
//! - **Encoding**: [`EntityEncoder`] promotes valid property names to columns
//!   until the cap, then folds the rest into `AggregatedProperties`
//! - **Writing**: [`PartitionBatchWriter`] submits one transaction per run of
//!   events sharing a partition key
//! - **Sink**: [`TableSink`] buffers channel input by size and period

mod client;
mod config;
mod crop;
mod entity;
mod error;
mod format;
mod keys;
mod metrics;
mod provision;
mod sink;
mod writer;

// Re-export public API
pub use client::{
    InMemoryTableClient, MAX_TRANSACTION_ACTIONS, SubmittedTransaction, TableAction,
    TableActionKind, TableClient,
};
pub use config::{DEFAULT_BATCH_SIZE, DEFAULT_PERIOD, DEFAULT_TABLE_NAME, TableConfig};
pub use crop::{MAX_STRING_BYTES, crop, crop_utf16, utf16_byte_len};
pub use entity::{
    COLUMN_AGGREGATED_PROPERTIES, COLUMN_EXCEPTION, COLUMN_LEVEL, COLUMN_MESSAGE_TEMPLATE,
    COLUMN_RENDERED_MESSAGE, EncoderOptions, EntityEncoder, EntityValue, MAX_DATA_COLUMNS,
    TableEntity, encode_entity, is_valid_column_name,
};
pub use error::{StoreError, TableSinkError};
pub use format::format_value;
pub use keys::{
    DefaultKeyGenerator, KeyGenerator, MAX_KEY_LEN, PARTITION_BUCKET_MILLIS,
    PropertiesKeyGenerator, key_generator, sanitize_key, time_bucket_key,
};
pub use metrics::{MetricsSnapshot, TableSinkMetrics, TableSinkMetricsHandle};
pub use provision::{DiagnosticSink, TracingDiagnostics, ensure_table};
pub use sink::TableSink;
pub use writer::{PartitionBatchWriter, WriteOutcome};



#[cfg(test)]
#[path = "entity_test.rs"]
mod entity_test;
