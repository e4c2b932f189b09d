//! Configuration validation
//!
//! Validates config consistency:
//! - Table name is present
//! - Batch size fits the store's per-transaction limit
//! - Row key suffix leaves room for the generated key
//! - Property allow-list has no empty or duplicate names

use std::collections::HashSet;

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::sinks::MAX_BATCH_SIZE;

/// Longest row key suffix accepted, in UTF-16 units
///
/// Row keys are capped at 512 units; the generator needs room for the
/// separators and its 32-character unique token.
pub const MAX_ROW_KEY_SUFFIX_LEN: usize = 256;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let sink = &config.sink;
    if !sink.enabled {
        tracing::warn!("table sink is disabled, events will not be stored");
        return Ok(());
    }

    if sink.table_name.trim().is_empty() {
        return Err(ConfigError::missing("sink", "table_name"));
    }

    if sink.batch_size == 0 || sink.batch_size > MAX_BATCH_SIZE {
        return Err(ConfigError::invalid(
            "sink",
            "batch_size",
            format!("must be between 1 and {MAX_BATCH_SIZE}, got {}", sink.batch_size),
        ));
    }

    if sink.period.is_zero() {
        return Err(ConfigError::invalid("sink", "period", "must be greater than zero"));
    }

    if sink.queue_size == 0 {
        return Err(ConfigError::invalid("sink", "queue_size", "must be greater than zero"));
    }

    if let Some(ref suffix) = sink.row_key_suffix
        && suffix.encode_utf16().count() > MAX_ROW_KEY_SUFFIX_LEN
    {
        return Err(ConfigError::invalid(
            "sink",
            "row_key_suffix",
            format!("must be at most {MAX_ROW_KEY_SUFFIX_LEN} UTF-16 units"),
        ));
    }

    if let Some(ref columns) = sink.property_columns {
        let mut seen = HashSet::new();
        for name in columns {
            if name.trim().is_empty() {
                return Err(ConfigError::invalid(
                    "sink",
                    "property_columns",
                    "contains an empty name",
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::invalid(
                    "sink",
                    "property_columns",
                    format!("lists '{name}' more than once"),
                ));
            }
        }
    }

    Ok(())
}
