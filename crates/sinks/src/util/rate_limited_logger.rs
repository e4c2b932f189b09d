//! Rate-limited warning logger
//!
//! A batch full of events that fail to render, or a store that rejects every
//! single-record write, would otherwise produce one log line per event.
//! This logger emits at most one line per interval and reports how many
//! occurrences were suppressed in between.
//!
//! # Example
//!
//! ```ignore
//! use tablelog_sinks::util::RateLimitedLogger;
//! use std::time::Duration;
//!
//! let logger = RateLimitedLogger::new(Duration::from_secs(10));
//!
//! // Only logs once per 10 seconds, even if called frequently
//! for _ in 0..1000 {
//!     logger.warn("failed to encode event", &err, template);
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval between log lines
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Maximum context length included in a log line, in characters
pub const MAX_CONTEXT_LOG_LENGTH: usize = 256;

/// Logger that emits at most one warning per interval
///
/// Thread-safe: atomic counters plus a mutex around the last log time.
pub struct RateLimitedLogger {
    /// Minimum interval between log messages
    min_interval: Duration,

    /// Last time we logged
    last_log_time: Mutex<Option<Instant>>,

    /// Occurrences since last log
    pending: AtomicU64,

    /// Total occurrences ever recorded
    total: AtomicU64,
}

impl RateLimitedLogger {
    /// Create a new rate-limited logger with the specified interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_log_time: Mutex::new(None),
            pending: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Record an occurrence and log it if the interval has elapsed
    ///
    /// `context` (typically the message template) is cut to
    /// [`MAX_CONTEXT_LOG_LENGTH`] characters. Returns true if a line was
    /// emitted.
    pub fn warn(&self, message: &str, error: &dyn std::fmt::Display, context: &str) -> bool {
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);

        if !self.should_log() {
            return false;
        }

        let count = self.pending.swap(0, Ordering::Relaxed);
        let total = self.total.load(Ordering::Relaxed);
        let context = truncate_context(context);

        if count > 1 {
            tracing::warn!(
                error = %error,
                context = %context,
                suppressed_count = count - 1,
                total = total,
                "{} (rate-limited)", message
            );
        } else {
            tracing::warn!(error = %error, context = %context, total = total, "{}", message);
        }
        true
    }

    fn should_log(&self) -> bool {
        let mut last_time = self.last_log_time.lock();
        let now = Instant::now();

        match *last_time {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                *last_time = Some(now);
                true
            }
        }
    }

    /// Occurrences since the last emitted line
    pub fn pending_count(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    /// Total occurrences recorded
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl Default for RateLimitedLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL)
    }
}

fn truncate_context(context: &str) -> String {
    match context.char_indices().nth(MAX_CONTEXT_LOG_LENGTH) {
        Some((idx, _)) => format!(
            "{}... (truncated from {} bytes)",
            &context[..idx],
            context.len()
        ),
        None => context.to_string(),
    }
}
