//! Tablelog - Sinks
//!
//! Writes structured log events into a column-limited, size-limited
//! key/value table store.
//!
//! # Architecture
//!
//! ```text
//! [LogEvent] --> [KeyGenerator] --> [EntityEncoder] --> [PartitionBatchWriter] --> [TableClient]
//!                 partition/row      flat TableEntity     one transaction per
//!                 keys               (<= 252 columns)     contiguous partition run
//! ```
//!
//! The [`table::TableSink`] task sits in front of the writer: it receives
//! events over a tokio channel, buffers them by size and period, and hands
//! each buffer to the writer.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tablelog_sinks::table::{InMemoryTableClient, TableConfig, TableSink};
//! use tokio::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel(1000);
//! let client = Arc::new(InMemoryTableClient::new("LogEventEntity"));
//! let sink = TableSink::new(TableConfig::default(), client, rx);
//!
//! tokio::spawn(sink.run());
//! tx.send(event).await?;
//! ```

/// Table store sink - encoder, key generators, batched writer
pub mod table;

/// Shared utilities (rate-limited logging)
pub mod util;

pub use table::{
    EntityEncoder, EntityValue, InMemoryTableClient, KeyGenerator, PartitionBatchWriter,
    TableClient, TableConfig, TableEntity, TableSink, TableSinkError, WriteOutcome,
};
