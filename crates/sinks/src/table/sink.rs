//! Table sink implementation
//!
//! Receives log events over a channel and writes them to the table store,
//! either buffered into partition transactions or one record at a time.

use std::sync::Arc;

use tablelog_config::WriteMode;
use tablelog_protocol::LogEvent;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::client::TableClient;
use super::config::TableConfig;
use super::error::Result;
use super::metrics::{MetricsSnapshot, TableSinkMetrics, TableSinkMetricsHandle};
use super::provision::{DiagnosticSink, TracingDiagnostics, ensure_table};
use super::writer::PartitionBatchWriter;

/// Sink writing log events to a key/value table store
///
/// In batched mode events are buffered until `batch_size` is reached or
/// `period` elapses, then handed to the [`PartitionBatchWriter`]. In single
/// mode each event is upserted as it arrives.
pub struct TableSink {
    /// Channel receiver for events
    receiver: mpsc::Receiver<LogEvent>,

    /// Configuration
    config: TableConfig,

    /// Store client
    client: Arc<dyn TableClient>,

    /// Encodes and submits buffered events
    writer: PartitionBatchWriter,

    /// Events waiting for the next flush
    buffer: Vec<LogEvent>,

    /// Receives tolerated provisioning failures
    diagnostics: Arc<dyn DiagnosticSink>,

    /// Metrics (Arc for sharing with metrics handle)
    metrics: Arc<TableSinkMetrics>,

    /// Sink name for identification
    name: String,
}

impl TableSink {
    /// Create a new table sink
    pub fn new(
        config: TableConfig,
        client: Arc<dyn TableClient>,
        receiver: mpsc::Receiver<LogEvent>,
    ) -> Self {
        Self::with_name(config, client, receiver, "table")
    }

    /// Create a new table sink with a custom name
    pub fn with_name(
        config: TableConfig,
        client: Arc<dyn TableClient>,
        receiver: mpsc::Receiver<LogEvent>,
        name: impl Into<String>,
    ) -> Self {
        let metrics = Arc::new(TableSinkMetrics::new());
        let writer = PartitionBatchWriter::new(Arc::clone(&client), Arc::new(config.build_encoder()))
            .with_metrics(Arc::clone(&metrics));

        Self {
            receiver,
            buffer: Vec::with_capacity(config.batch_size),
            config,
            client,
            writer,
            diagnostics: Arc::new(TracingDiagnostics),
            metrics,
            name: name.into(),
        }
    }

    /// Route tolerated provisioning failures to `diagnostics`
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Get reference to metrics
    pub fn metrics(&self) -> &TableSinkMetrics {
        &self.metrics
    }

    /// Get a metrics handle for reporting, `None` when metrics are disabled
    ///
    /// Counters are kept either way; `run` still returns the final snapshot.
    pub fn metrics_handle(&self) -> Option<TableSinkMetricsHandle> {
        self.config.metrics_enabled.then(|| {
            TableSinkMetricsHandle::new(
                self.name.clone(),
                Arc::clone(&self.metrics),
                self.config.metrics_interval,
            )
        })
    }

    /// Get the sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get reference to config
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Run the sink until the channel closes
    ///
    /// # Errors
    ///
    /// Returns [`TableSinkError::Provision`](super::TableSinkError::Provision)
    /// when the table cannot be created and creation failures are not
    /// bypassed. Write failures are logged and do not stop the sink.
    pub async fn run(mut self) -> Result<MetricsSnapshot> {
        tracing::info!(
            table = %self.config.table_name,
            mode = ?self.config.mode,
            key_strategy = self.config.key_strategy.as_str(),
            batch_size = self.config.batch_size,
            "table sink starting"
        );

        ensure_table(
            self.client.as_ref(),
            self.config.bypass_table_create_validation,
            self.diagnostics.as_ref(),
        )
        .await?;

        match self.config.mode {
            WriteMode::Batched => self.run_batched().await,
            WriteMode::Single => self.run_single().await,
        }

        let snapshot = self.metrics.snapshot();
        tracing::info!(
            sink = %self.name,
            events_received = snapshot.events_received,
            records = snapshot.records_written,
            transactions = snapshot.transactions_written,
            encode_errors = snapshot.encode_errors,
            write_errors = snapshot.write_errors,
            "table sink shutting down"
        );

        Ok(snapshot)
    }

    async fn run_batched(&mut self) {
        let period = self.config.period;
        let mut flush_interval = tokio::time::interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                event_opt = self.receiver.recv() => {
                    match event_opt {
                        Some(event) => {
                            self.metrics.record_event_received();
                            self.buffer.push(event);

                            if self.buffer.len() >= self.config.batch_size {
                                self.flush().await;
                            }
                        }
                        None => break, // Channel closed
                    }
                }
                _ = flush_interval.tick() => {
                    if !self.buffer.is_empty() {
                        self.flush().await;
                    }
                }
            }
        }

        // Final flush
        if !self.buffer.is_empty() {
            self.flush().await;
        }
    }

    async fn run_single(&mut self) {
        while let Some(event) = self.receiver.recv().await {
            self.metrics.record_event_received();
            self.write_single(&event).await;
        }
    }

    /// Hand the buffer to the writer
    async fn flush(&mut self) {
        let events = std::mem::replace(
            &mut self.buffer,
            Vec::with_capacity(self.config.batch_size),
        );

        match self.writer.write_batch(&events).await {
            Ok(outcome) => {
                tracing::debug!(
                    events = outcome.events,
                    records = outcome.records_written,
                    transactions = outcome.transactions,
                    skipped = outcome.encode_failures,
                    "flushed table batch"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, events = events.len(), "failed to write batch");
            }
        }
    }

    /// Encode and upsert one event, logging any failure
    pub async fn write_single(&self, event: &LogEvent) {
        if let Err(e) = self.writer.write_single(event).await {
            tracing::error!(error = %e, "failed to write record");
        }
    }
}
