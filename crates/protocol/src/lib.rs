//! Tablelog - Protocol
//!
//! Structured log event model consumed by the table sinks.
//!
//! A [`LogEvent`] carries a timestamp, a [`LogLevel`], a [`MessageTemplate`]
//! and an ordered list of named [`PropertyValue`]s. Property values form a
//! closed tree: scalars, sequences, mappings and named structures.
//!
//! ```
//! use tablelog_protocol::{LogEvent, LogLevel, FormatProvider};
//!
//! let event = LogEvent::now(LogLevel::Information, "Hello {Name}")
//!     .with_property("Name", "World");
//!
//! let rendered = event.render_message(&FormatProvider::default()).unwrap();
//! assert_eq!(rendered, "Hello \"World\"");
//! ```

mod error;
mod event;
mod level;
mod template;
mod value;

pub use error::{ProtocolError, Result};
pub use event::LogEvent;
pub use level::LogLevel;
pub use template::{BraceRenderer, MessageTemplate, TemplateRenderer};
pub use value::{FormatProvider, MAX_RENDER_DEPTH, PropertyValue, ScalarValue};

#[cfg(test)]
#[path = "value_test.rs"]
mod value_test;
