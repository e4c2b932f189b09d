//! Structured property values
//!
//! [`PropertyValue`] is the closed set of shapes a log property can take.
//! Every value has a canonical textual rendering, used both by the template
//! renderer and by sinks that cannot store a value natively.
//!
//! # Rendering
//!
//! | Shape | Rendering |
//! |-------|-----------|
//! | string scalar | `"text"` (inner `"` escaped) |
//! | other scalar | plain text (`42`, `true`, `null`) |
//! | sequence | `[1, "a", 3.5]` |
//! | mapping | `[("key": 1), (2: "b")]` |
//! | structure | `Point { X: 1, Y: 2 }` |

use std::fmt::Write;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use uuid::Uuid;

/// Composite nesting depth rendered before output is cut with `...`
pub const MAX_RENDER_DEPTH: usize = 64;

/// Culture-like settings that make textual rendering deterministic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatProvider {
    /// strftime pattern for timestamps; `None` renders RFC 3339
    pub timestamp_format: Option<String>,

    /// Separator between integer and fractional digits of floats
    pub decimal_separator: char,
}

impl Default for FormatProvider {
    fn default() -> Self {
        Self {
            timestamp_format: None,
            decimal_separator: '.',
        }
    }
}

impl FormatProvider {
    /// Set the timestamp pattern
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = Some(format.into());
        self
    }

    /// Set the decimal separator
    pub fn with_decimal_separator(mut self, separator: char) -> Self {
        self.decimal_separator = separator;
        self
    }

    fn write_float(&self, out: &mut String, text: String) {
        if self.decimal_separator == '.' {
            out.push_str(&text);
        } else {
            out.push_str(&text.replace('.', &self.decimal_separator.to_string()));
        }
    }

    fn write_utc(&self, out: &mut String, ts: &DateTime<Utc>) {
        match &self.timestamp_format {
            Some(pattern) => {
                let _ = write!(out, "{}", ts.format(pattern));
            }
            None => out.push_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }

    fn write_offset(&self, out: &mut String, ts: &DateTime<FixedOffset>) {
        match &self.timestamp_format {
            Some(pattern) => {
                let _ = write!(out, "{}", ts.format(pattern));
            }
            None => out.push_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
        }
    }
}

/// A primitive property value
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Bytes(Bytes),
    DateTime(DateTime<Utc>),
    DateTimeOffset(DateTime<FixedOffset>),
    Uuid(Uuid),
}

impl ScalarValue {
    /// Render this scalar into `out`
    pub fn render_into(&self, out: &mut String, provider: &FormatProvider) {
        match self {
            Self::Null => out.push_str("null"),
            Self::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
            Self::I32(v) => {
                let _ = write!(out, "{v}");
            }
            Self::I64(v) => {
                let _ = write!(out, "{v}");
            }
            Self::U64(v) => {
                let _ = write!(out, "{v}");
            }
            Self::F32(v) => provider.write_float(out, v.to_string()),
            Self::F64(v) => provider.write_float(out, v.to_string()),
            Self::Char(c) => {
                out.push('\'');
                out.push(*c);
                out.push('\'');
            }
            Self::String(s) => {
                out.push('"');
                for ch in s.chars() {
                    if ch == '"' {
                        out.push('\\');
                    }
                    out.push(ch);
                }
                out.push('"');
            }
            Self::Bytes(b) => {
                out.push_str("0x");
                for byte in b.iter() {
                    let _ = write!(out, "{byte:02x}");
                }
            }
            Self::DateTime(ts) => provider.write_utc(out, ts),
            Self::DateTimeOffset(ts) => provider.write_offset(out, ts),
            Self::Uuid(id) => {
                let _ = write!(out, "{}", id.hyphenated());
            }
        }
    }

    /// Render this scalar to a new string
    pub fn render(&self, provider: &FormatProvider) -> String {
        let mut out = String::new();
        self.render_into(&mut out, provider);
        out
    }
}

/// A structured property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A single primitive
    Scalar(ScalarValue),

    /// Ordered list of values
    Sequence(Vec<PropertyValue>),

    /// Ordered key/value pairs; keys are not assumed unique
    Mapping(Vec<(ScalarValue, PropertyValue)>),

    /// Named bag of fields, e.g. a destructured object
    Structure {
        type_name: Option<String>,
        fields: Vec<(String, PropertyValue)>,
    },
}

impl PropertyValue {
    /// Build a structure value
    pub fn structure(
        type_name: Option<impl Into<String>>,
        fields: Vec<(String, PropertyValue)>,
    ) -> Self {
        Self::Structure {
            type_name: type_name.map(Into::into),
            fields,
        }
    }

    /// Get the scalar inside, if this is a scalar
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Render to canonical text
    pub fn render(&self, provider: &FormatProvider) -> String {
        let mut out = String::new();
        self.render_into(&mut out, provider);
        out
    }

    /// Render to canonical text, appending to `out`
    pub fn render_into(&self, out: &mut String, provider: &FormatProvider) {
        self.render_nested(out, provider, 0);
    }

    fn render_nested(&self, out: &mut String, provider: &FormatProvider, depth: usize) {
        if depth >= MAX_RENDER_DEPTH && !matches!(self, Self::Scalar(_)) {
            out.push_str("...");
            return;
        }

        match self {
            Self::Scalar(s) => s.render_into(out, provider),
            Self::Sequence(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.render_nested(out, provider, depth + 1);
                }
                out.push(']');
            }
            Self::Mapping(entries) => {
                out.push('[');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push('(');
                    key.render_into(out, provider);
                    out.push_str(": ");
                    value.render_nested(out, provider, depth + 1);
                    out.push(')');
                }
                out.push(']');
            }
            Self::Structure { type_name, fields } => {
                if let Some(name) = type_name {
                    out.push_str(name);
                    out.push(' ');
                }
                out.push('{');
                for (i, (name, value)) in fields.iter().enumerate() {
                    out.push_str(if i > 0 { ", " } else { " " });
                    out.push_str(name);
                    out.push_str(": ");
                    value.render_nested(out, provider, depth + 1);
                }
                out.push_str(" }");
            }
        }
    }
}

impl From<ScalarValue> for PropertyValue {
    fn from(value: ScalarValue) -> Self {
        Self::Scalar(value)
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ScalarValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }

            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(ScalarValue::$variant(value.into()))
                }
            }
        )*
    };
}

scalar_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
    &str => String,
    Bytes => Bytes,
    Vec<u8> => Bytes,
    DateTime<Utc> => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    Uuid => Uuid,
}
