//! Table sink metrics
//!
//! Atomic counters for tracking sink throughput and health.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics for the table sink
#[derive(Debug, Default)]
pub struct TableSinkMetrics {
    /// Events received from the channel
    pub events_received: AtomicU64,

    /// Records accepted by the store
    pub records_written: AtomicU64,

    /// Transactions accepted by the store
    pub transactions_written: AtomicU64,

    /// Buffer flushes performed
    pub flush_count: AtomicU64,

    /// Events skipped because encoding failed
    pub encode_errors: AtomicU64,

    /// Writes rejected by the store
    pub write_errors: AtomicU64,
}

impl TableSinkMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            events_received: AtomicU64::new(0),
            records_written: AtomicU64::new(0),
            transactions_written: AtomicU64::new(0),
            flush_count: AtomicU64::new(0),
            encode_errors: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted transaction of `records` entities
    #[inline]
    pub fn record_transaction(&self, records: u64) {
        self.transactions_written.fetch_add(1, Ordering::Relaxed);
        self.records_written.fetch_add(records, Ordering::Relaxed);
    }

    /// Record an accepted single-record write
    #[inline]
    pub fn record_single_write(&self) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_flush(&self) {
        self.flush_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_encode_error(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            transactions_written: self.transactions_written.load(Ordering::Relaxed),
            flush_count: self.flush_count.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub events_received: u64,
    pub records_written: u64,
    pub transactions_written: u64,
    pub flush_count: u64,
    pub encode_errors: u64,
    pub write_errors: u64,
}

/// Handle for reading table sink metrics
///
/// Holds an Arc to the metrics, so it remains valid after the sink is
/// consumed by `run()`.
#[derive(Debug, Clone)]
pub struct TableSinkMetricsHandle {
    id: String,
    metrics: Arc<TableSinkMetrics>,
    interval: Duration,
}

impl TableSinkMetricsHandle {
    pub fn new(id: String, metrics: Arc<TableSinkMetrics>, interval: Duration) -> Self {
        Self {
            id,
            metrics,
            interval,
        }
    }

    pub fn sink_id(&self) -> &str {
        &self.id
    }

    pub fn sink_type(&self) -> &str {
        "table"
    }

    /// Suggested reporting interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
