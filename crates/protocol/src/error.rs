//! Protocol error types

use thiserror::Error;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while interpreting log events
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Level name did not match any known level
    #[error("unknown log level: {0}")]
    UnknownLevel(String),

    /// Template renderer failed for a single event
    #[error("failed to render template '{template}': {message}")]
    Render { template: String, message: String },
}

impl ProtocolError {
    /// Create a render error
    #[inline]
    pub fn render(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            template: template.into(),
            message: message.into(),
        }
    }
}
