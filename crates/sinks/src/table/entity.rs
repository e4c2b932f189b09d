//! Flat entity records and the entity encoder
//!
//! One [`LogEvent`] becomes one [`TableEntity`]:
//!
//! | Column | Source |
//! |--------|--------|
//! | `MessageTemplate` | raw template text |
//! | `Level` | level name |
//! | `RenderedMessage` | template with properties substituted |
//! | `Exception` | exception payload, when present |
//! | `<property>` | one column per valid, allowed property |
//! | `AggregatedProperties` | properties past the column cap, as a mapping |
//!
//! Encoding never fails because of the data itself: invalid names are
//! skipped, long strings are cropped and surplus properties overflow into
//! `AggregatedProperties`. Only a template rendering failure is an error.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tablelog_protocol::{FormatProvider, LogEvent, PropertyValue, ScalarValue};
use uuid::Uuid;

use super::crop::{MAX_STRING_BYTES, crop, utf16_byte_len};
use super::error::Result;
use super::format::format_value;
use super::keys::KeyGenerator;

/// Data columns per entity; the store adds its own key and timestamp fields
pub const MAX_DATA_COLUMNS: usize = 252;

pub const COLUMN_MESSAGE_TEMPLATE: &str = "MessageTemplate";
pub const COLUMN_LEVEL: &str = "Level";
pub const COLUMN_RENDERED_MESSAGE: &str = "RenderedMessage";
pub const COLUMN_EXCEPTION: &str = "Exception";
pub const COLUMN_AGGREGATED_PROPERTIES: &str = "AggregatedProperties";

const RESERVED_COLUMNS: [&str; 5] = [
    COLUMN_MESSAGE_TEMPLATE,
    COLUMN_LEVEL,
    COLUMN_RENDERED_MESSAGE,
    COLUMN_EXCEPTION,
    COLUMN_AGGREGATED_PROPERTIES,
];

/// Dot-separated identifier segments, none starting with a digit
static COLUMN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\d\W]\w*(?:\.[^\d\W]\w*)*$").expect("valid column name pattern"));

/// Check whether `name` may become a column
#[inline]
pub fn is_valid_column_name(name: &str) -> bool {
    COLUMN_NAME.is_match(name)
}

// =============================================================================
// Entity
// =============================================================================

/// A column value in one of the store's native types
#[derive(Debug, Clone, PartialEq)]
pub enum EntityValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),
    Binary(Bytes),
    DateTime(DateTime<Utc>),
    DateTimeOffset(DateTime<FixedOffset>),
    Guid(Uuid),
}

impl EntityValue {
    /// String content, if this is a string column
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Store type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Edm.Boolean",
            Self::Int32(_) => "Edm.Int32",
            Self::Int64(_) => "Edm.Int64",
            Self::Double(_) => "Edm.Double",
            Self::String(_) => "Edm.String",
            Self::Binary(_) => "Edm.Binary",
            Self::DateTime(_) | Self::DateTimeOffset(_) => "Edm.DateTime",
            Self::Guid(_) => "Edm.Guid",
        }
    }

    /// Crop string values to [`MAX_STRING_BYTES`]
    fn cropped(self) -> Self {
        match self {
            Self::String(s) if utf16_byte_len(&s) > MAX_STRING_BYTES => {
                Self::String(crop(&s, MAX_STRING_BYTES).to_string())
            }
            other => other,
        }
    }
}

impl From<&str> for EntityValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// A flat record: two key columns, a timestamp and ordered data columns
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntity {
    partition_key: String,
    row_key: String,
    timestamp: DateTime<FixedOffset>,
    columns: Vec<(String, EntityValue)>,
}

impl TableEntity {
    /// Create an entity without data columns
    pub fn new(
        partition_key: impl Into<String>,
        row_key: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            timestamp,
            columns: Vec::new(),
        }
    }

    #[inline]
    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    #[inline]
    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    #[inline]
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Data columns in insertion order
    #[inline]
    pub fn columns(&self) -> &[(String, EntityValue)] {
        &self.columns
    }

    /// Number of data columns (keys and timestamp excluded)
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Value of a data column
    pub fn get(&self, name: &str) -> Option<&EntityValue> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Check whether a data column exists
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Append a data column; the caller guarantees the name is new
    pub fn push(&mut self, name: impl Into<String>, value: EntityValue) {
        self.columns.push((name.into(), value));
    }

    /// Set a column, replacing an existing value in place
    pub fn set(&mut self, name: &str, value: EntityValue) {
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((name.to_string(), value)),
        }
    }

    /// Merge `other`'s columns and timestamp into this entity (upsert-merge)
    pub fn merge(&mut self, other: TableEntity) {
        self.timestamp = other.timestamp;
        for (name, value) in other.columns {
            self.set(&name, value);
        }
    }
}

// =============================================================================
// Encoder
// =============================================================================

/// Settings applied to every encoded event
#[derive(Debug, Clone, Default)]
pub struct EncoderOptions {
    /// Rendering settings for messages and textual values
    pub format_provider: FormatProvider,

    /// Suffix passed to the key generator for every row key
    pub row_key_suffix: Option<String>,

    /// Property names allowed to become columns; all when `None`
    pub allowed_columns: Option<HashSet<String>>,

    /// Convert the record timestamp to UTC
    pub store_timestamp_in_utc: bool,
}

impl EncoderOptions {
    #[inline]
    fn allows(&self, name: &str) -> bool {
        self.allowed_columns
            .as_ref()
            .is_none_or(|allowed| allowed.contains(name))
    }
}

/// Encode one event into a flat entity
///
/// Properties are visited in event order. Each valid, allowed property
/// becomes a column while fewer than `MAX_DATA_COLUMNS - 1` columns exist;
/// later ones (and ones whose name is already taken by a fixed column) are
/// collected into `AggregatedProperties`, which therefore always fits.
///
/// # Errors
///
/// Returns [`TableSinkError::Encode`](super::TableSinkError::Encode) when the
/// event's template renderer fails.
pub fn encode_entity(
    event: &LogEvent,
    options: &EncoderOptions,
    keys: &dyn KeyGenerator,
) -> Result<TableEntity> {
    let provider = &options.format_provider;
    let rendered = event.render_message(provider)?;

    let timestamp = if options.store_timestamp_in_utc {
        event.timestamp().with_timezone(&Utc).fixed_offset()
    } else {
        event.timestamp()
    };

    let mut entity = TableEntity::new(
        keys.partition_key(event),
        keys.row_key(event, options.row_key_suffix.as_deref()),
        timestamp,
    );

    entity.push(
        COLUMN_MESSAGE_TEMPLATE,
        EntityValue::from(event.template().text()).cropped(),
    );
    entity.push(COLUMN_LEVEL, EntityValue::from(event.level().as_str()));
    entity.push(COLUMN_RENDERED_MESSAGE, EntityValue::String(rendered).cropped());
    if let Some(exception) = event.exception() {
        entity.push(COLUMN_EXCEPTION, EntityValue::from(exception).cropped());
    }

    let mut overflow: Vec<(ScalarValue, PropertyValue)> = Vec::new();
    for (name, value) in event.properties() {
        if !is_valid_column_name(name) || !options.allows(name) {
            continue;
        }

        if RESERVED_COLUMNS.contains(&name.as_str())
            || entity.contains(name)
            || entity.column_count() >= MAX_DATA_COLUMNS - 1
        {
            overflow.push((ScalarValue::String(name.clone()), value.clone()));
            continue;
        }

        entity.push(name.clone(), format_value(value, provider).cropped());
    }

    if !overflow.is_empty() {
        let aggregated = PropertyValue::Mapping(overflow).render(provider);
        entity.push(
            COLUMN_AGGREGATED_PROPERTIES,
            EntityValue::String(aggregated).cropped(),
        );
    }

    Ok(entity)
}

/// Encoder bound to one key strategy and option set
///
/// Cheap to share behind an `Arc`; encoding takes `&self`.
#[derive(Debug, Clone)]
pub struct EntityEncoder {
    options: EncoderOptions,
    keys: Arc<dyn KeyGenerator>,
}

impl EntityEncoder {
    pub fn new(options: EncoderOptions, keys: Arc<dyn KeyGenerator>) -> Self {
        Self { options, keys }
    }

    #[inline]
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Partition key the encoded entity will carry
    #[inline]
    pub fn partition_key(&self, event: &LogEvent) -> String {
        self.keys.partition_key(event)
    }

    /// Encode one event
    pub fn encode(&self, event: &LogEvent) -> Result<TableEntity> {
        encode_entity(event, &self.options, self.keys.as_ref())
    }
}
