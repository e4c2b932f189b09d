//! Log events

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use crate::{BraceRenderer, FormatProvider, LogLevel, MessageTemplate, PropertyValue, Result, TemplateRenderer};

/// A single structured log event
///
/// Events are created by the logging caller and consumed once by a sink.
/// Properties keep insertion order; sinks rely on it when deciding which
/// properties become first-class columns.
#[derive(Debug, Clone)]
pub struct LogEvent {
    timestamp: DateTime<FixedOffset>,
    level: LogLevel,
    template: MessageTemplate,
    properties: Vec<(String, PropertyValue)>,
    exception: Option<String>,
    renderer: Arc<dyn TemplateRenderer>,
}

impl LogEvent {
    /// Create an event without properties
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        level: LogLevel,
        template: impl Into<MessageTemplate>,
    ) -> Self {
        Self {
            timestamp,
            level,
            template: template.into(),
            properties: Vec::new(),
            exception: None,
            renderer: Arc::new(BraceRenderer),
        }
    }

    /// Create an event stamped with the current UTC time
    pub fn now(level: LogLevel, template: impl Into<MessageTemplate>) -> Self {
        Self::new(Utc::now().fixed_offset(), level, template)
    }

    /// Append a property
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// Append a property in place
    pub fn add_property(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.push((name.into(), value.into()));
    }

    /// Attach an error/exception payload
    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    /// Replace the template renderer
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    #[inline]
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    #[inline]
    pub fn template(&self) -> &MessageTemplate {
        &self.template
    }

    #[inline]
    pub fn properties(&self) -> &[(String, PropertyValue)] {
        &self.properties
    }

    /// First property with the given name
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    #[inline]
    pub fn exception(&self) -> Option<&str> {
        self.exception.as_deref()
    }

    /// Render the template with this event's properties
    ///
    /// # Errors
    ///
    /// Propagates the renderer's failure.
    pub fn render_message(&self, provider: &FormatProvider) -> Result<String> {
        self.renderer.render(&self.template, &self.properties, provider)
    }
}
