//! Message templates and rendering
//!
//! The sinks never parse templates themselves; they call a
//! [`TemplateRenderer`]. [`BraceRenderer`] is the built-in renderer used when
//! the logging front end does not supply one.

use crate::{FormatProvider, PropertyValue, Result};

/// Raw message template text, e.g. `"Hello {Name}"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageTemplate {
    text: String,
}

impl MessageTemplate {
    /// Create a template from its raw text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Raw template text
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<&str> for MessageTemplate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for MessageTemplate {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Substitutes property values into a template
pub trait TemplateRenderer: std::fmt::Debug + Send + Sync {
    /// Render `template` using `properties`
    ///
    /// # Errors
    ///
    /// A failure is fatal for the event being rendered only.
    fn render(
        &self,
        template: &MessageTemplate,
        properties: &[(String, PropertyValue)],
        provider: &FormatProvider,
    ) -> Result<String>;
}

/// Renders `{Name}` tokens from the event's properties
///
/// - `{{` and `}}` are literal braces
/// - `{@Name}` / `{$Name}` hints and `:format` / `,alignment` suffixes are
///   accepted and ignored
/// - tokens naming a missing property, and unclosed tokens, are kept verbatim
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceRenderer;

impl BraceRenderer {
    fn property_name(token: &str) -> &str {
        let name = token.trim_start_matches(['@', '$']);
        let end = name.find([':', ',']).unwrap_or(name.len());
        &name[..end]
    }
}

impl TemplateRenderer for BraceRenderer {
    fn render(
        &self,
        template: &MessageTemplate,
        properties: &[(String, PropertyValue)],
        provider: &FormatProvider,
    ) -> Result<String> {
        let text = template.text();
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find(['{', '}']) {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") || tail.starts_with("}}") {
                out.push_str(&tail[..1]);
                rest = &tail[2..];
                continue;
            }

            if tail.starts_with('}') {
                out.push('}');
                rest = &tail[1..];
                continue;
            }

            let Some(close) = tail.find('}') else {
                out.push_str(tail);
                rest = "";
                break;
            };

            let token = &tail[1..close];
            let name = Self::property_name(token);
            match properties.iter().find(|(n, _)| n == name) {
                Some((_, value)) => value.render_into(&mut out, provider),
                None => out.push_str(&tail[..=close]),
            }
            rest = &tail[close + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }
}
