//! Partition and row key generation
//!
//! Both strategies share the time-bucketed partition key: the event time is
//! floored to the minute and subtracted from `u64::MAX`, then zero-padded to
//! 20 digits so that lexicographic order puts the newest partition first.
//!
//! | Strategy | Row key |
//! |----------|---------|
//! | [`DefaultKeyGenerator`] | `{descending millis}\|{Level}[\|{suffix}]\|{token}` |
//! | [`PropertiesKeyGenerator`] | `{Level}\|{Template}[\|{suffix}]\|{token}` |
//!
//! Row keys are capped at [`MAX_KEY_LEN`] UTF-16 units by shortening the part
//! before the suffix. The unique token is never cut, and neither is a suffix
//! of at most [`MAX_ROW_KEY_SUFFIX_LEN`] units.

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tablelog_config::{KeyStrategy, MAX_ROW_KEY_SUFFIX_LEN};
use tablelog_protocol::LogEvent;
use uuid::Uuid;

use super::crop::crop;

/// Longest key the store accepts, in UTF-16 units (1 KiB encoded)
pub const MAX_KEY_LEN: usize = 512;

/// Width of the partition bucket
pub const PARTITION_BUCKET_MILLIS: u64 = 60_000;

/// Derives the store keys of a log event
///
/// Implementations hold no mutable state and may be shared across tasks.
pub trait KeyGenerator: Debug + Send + Sync {
    /// Coarse grouping key; events with the same key can share a transaction
    fn partition_key(&self, event: &LogEvent) -> String;

    /// Key unique within the partition
    fn row_key(&self, event: &LogEvent, suffix: Option<&str>) -> String;
}

/// Build the generator selected in configuration
pub fn key_generator(strategy: KeyStrategy) -> Arc<dyn KeyGenerator> {
    match strategy {
        KeyStrategy::Default => Arc::new(DefaultKeyGenerator),
        KeyStrategy::Properties => Arc::new(PropertiesKeyGenerator),
    }
}

/// Time-ordered keys: newest partitions and rows sort first
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKeyGenerator;

impl KeyGenerator for DefaultKeyGenerator {
    fn partition_key(&self, event: &LogEvent) -> String {
        time_bucket_key(event.timestamp())
    }

    fn row_key(&self, event: &LogEvent, suffix: Option<&str>) -> String {
        let prefix = format!(
            "{:020}|{}",
            descending(epoch_millis(event.timestamp())),
            event.level()
        );
        bounded_row_key(&prefix, suffix)
    }
}

/// Content-derived row keys grouping events by level and template
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesKeyGenerator;

impl KeyGenerator for PropertiesKeyGenerator {
    fn partition_key(&self, event: &LogEvent) -> String {
        time_bucket_key(event.timestamp())
    }

    fn row_key(&self, event: &LogEvent, suffix: Option<&str>) -> String {
        let prefix = format!(
            "{}|{}",
            event.level(),
            sanitize_key(event.template().text())
        );
        bounded_row_key(&prefix, suffix)
    }
}

/// Descending, zero-padded minute bucket of `timestamp`
pub fn time_bucket_key(timestamp: DateTime<FixedOffset>) -> String {
    let millis = epoch_millis(timestamp);
    let bucket = millis - millis % PARTITION_BUCKET_MILLIS;
    format!("{:020}", descending(bucket))
}

/// Remove characters the store forbids in keys
///
/// Forbidden: `\`, `/`, `#`, `?`, U+0000-U+001F and U+007F-U+009F.
pub fn sanitize_key(s: &str) -> String {
    s.chars().filter(|&c| !is_forbidden_key_char(c)).collect()
}

#[inline]
fn is_forbidden_key_char(c: char) -> bool {
    matches!(c, '\\' | '/' | '#' | '?' | '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}')
}

/// Join `prefix`, the sanitized `suffix` and a fresh token, shortening the
/// prefix so the result fits in [`MAX_KEY_LEN`] units
///
/// A suffix longer than [`MAX_ROW_KEY_SUFFIX_LEN`] units is cut to that
/// length; shorter suffixes are kept whole.
fn bounded_row_key(prefix: &str, suffix: Option<&str>) -> String {
    let mut postfix = String::with_capacity(64);
    if let Some(suffix) = suffix {
        let suffix = sanitize_key(suffix);
        postfix.push('|');
        postfix.push_str(crop(&suffix, MAX_ROW_KEY_SUFFIX_LEN * 2));
    }
    postfix.push('|');
    postfix.push_str(&Uuid::new_v4().simple().to_string());

    let budget = MAX_KEY_LEN.saturating_sub(postfix.encode_utf16().count());
    let prefix = crop(prefix, budget * 2);

    let mut key = String::with_capacity(prefix.len() + postfix.len());
    key.push_str(prefix);
    key.push_str(&postfix);
    key
}

#[inline]
fn epoch_millis(timestamp: DateTime<FixedOffset>) -> u64 {
    u64::try_from(timestamp.timestamp_millis()).unwrap_or(0)
}

#[inline]
fn descending(value: u64) -> u64 {
    u64::MAX - value
}
