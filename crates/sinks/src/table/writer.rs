//! Partition-batched writer
//!
//! Turns an ordered run of events into store transactions. Events are never
//! reordered: a transaction is submitted whenever the next event's partition
//! key differs from the one being accumulated, and once more at the end of
//! the run. The caller bounds the run (at most [`MAX_TRANSACTION_ACTIONS`]
//! events); an oversized transaction is left for the store to reject.
//!
//! [`MAX_TRANSACTION_ACTIONS`]: super::client::MAX_TRANSACTION_ACTIONS

use std::sync::Arc;

use tablelog_protocol::LogEvent;

use crate::util::{DEFAULT_LOG_INTERVAL, RateLimitedLogger};

use super::client::{TableAction, TableClient};
use super::entity::EntityEncoder;
use super::error::{Result, TableSinkError};
use super::metrics::TableSinkMetrics;

/// Result of one [`PartitionBatchWriter::write_batch`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Events handed to the writer
    pub events: usize,

    /// Records accepted by the store
    pub records_written: usize,

    /// Transactions accepted by the store
    pub transactions: usize,

    /// Events skipped because encoding failed
    pub encode_failures: usize,
}

/// Writes event runs as single-partition transactions
pub struct PartitionBatchWriter {
    client: Arc<dyn TableClient>,
    encoder: Arc<EntityEncoder>,
    metrics: Arc<TableSinkMetrics>,
    encode_error_logger: RateLimitedLogger,
}

impl PartitionBatchWriter {
    pub fn new(client: Arc<dyn TableClient>, encoder: Arc<EntityEncoder>) -> Self {
        Self {
            client,
            encoder,
            metrics: Arc::new(TableSinkMetrics::new()),
            encode_error_logger: RateLimitedLogger::new(DEFAULT_LOG_INTERVAL),
        }
    }

    /// Record into shared metrics instead of private ones
    pub fn with_metrics(mut self, metrics: Arc<TableSinkMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &TableSinkMetrics {
        &self.metrics
    }

    pub fn encoder(&self) -> &EntityEncoder {
        &self.encoder
    }

    /// Encode and submit `events`, one transaction per run of equal partition keys
    ///
    /// An event whose message fails to render is skipped and counted; the
    /// rest of the run continues.
    ///
    /// # Errors
    ///
    /// Returns [`TableSinkError::Submit`] for the first transaction the store
    /// refuses. Transactions submitted before it stay written; events after
    /// it are not encoded.
    pub async fn write_batch(&self, events: &[LogEvent]) -> Result<WriteOutcome> {
        let mut outcome = WriteOutcome {
            events: events.len(),
            ..WriteOutcome::default()
        };
        let mut pending: Vec<TableAction> = Vec::with_capacity(events.len());
        let mut current_key = String::new();

        for event in events {
            let partition_key = self.encoder.partition_key(event);
            if !pending.is_empty() && partition_key != current_key {
                let actions = std::mem::take(&mut pending);
                self.submit(&current_key, actions, &mut outcome).await?;
            }
            current_key = partition_key;

            match self.encoder.encode(event) {
                Ok(entity) => pending.push(TableAction::upsert_merge(entity)),
                Err(e) => {
                    outcome.encode_failures += 1;
                    self.metrics.record_encode_error();
                    self.encode_error_logger.warn(
                        "failed to encode log event, skipping",
                        &e,
                        event.template().text(),
                    );
                }
            }
        }

        if !pending.is_empty() {
            self.submit(&current_key, pending, &mut outcome).await?;
        }

        Ok(outcome)
    }

    /// Encode one event and upsert it outside any transaction
    ///
    /// # Errors
    ///
    /// Returns [`TableSinkError::Encode`] when rendering fails and
    /// [`TableSinkError::Write`] when the store refuses the record.
    pub async fn write_single(&self, event: &LogEvent) -> Result<()> {
        let entity = self.encoder.encode(event).inspect_err(|_| {
            self.metrics.record_encode_error();
        })?;

        match self.client.upsert_entity(entity).await {
            Ok(()) => {
                self.metrics.record_single_write();
                Ok(())
            }
            Err(e) => {
                self.metrics.record_write_error();
                Err(TableSinkError::Write(e))
            }
        }
    }

    async fn submit(
        &self,
        partition_key: &str,
        actions: Vec<TableAction>,
        outcome: &mut WriteOutcome,
    ) -> Result<()> {
        let count = actions.len();
        self.metrics.record_flush();

        match self.client.submit_transaction(partition_key, actions).await {
            Ok(()) => {
                self.metrics.record_transaction(count as u64);
                outcome.transactions += 1;
                outcome.records_written += count;
                tracing::debug!(
                    table = %self.client.table_name(),
                    partition_key = %partition_key,
                    count,
                    "submitted transaction"
                );
                Ok(())
            }
            Err(source) => {
                self.metrics.record_write_error();
                Err(TableSinkError::Submit {
                    partition_key: partition_key.to_string(),
                    count,
                    source,
                })
            }
        }
    }
}
