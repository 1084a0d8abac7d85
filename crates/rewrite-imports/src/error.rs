//! Error types for the import rewriter

use crate::PLUGIN_NAME;

/// Result type for rewrite operations
pub type RewriteResult<T> = Result<T, RewriteError>;

/// Errors that can occur while rewriting a single file.
///
/// Every variant is scoped to one file; callers processing many files keep
/// going after an error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RewriteError {
    /// Stream content was supplied without opting in to streaming
    #[error("{plugin}: Streams are experimental and not supported by default. Set `experimentalEnableStreams` to enable them")]
    StreamingDisabled { plugin: &'static str },

    /// Options failed validation
    #[error("{plugin}: Invalid options: {message}")]
    InvalidOptions {
        plugin: &'static str,
        message: String,
    },
}

impl RewriteError {
    /// Create a streaming-disabled error
    pub fn streaming_disabled() -> Self {
        Self::StreamingDisabled {
            plugin: PLUGIN_NAME,
        }
    }

    /// Create an invalid options error
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            plugin: PLUGIN_NAME,
            message: message.into(),
        }
    }

    /// Name of the component that raised the error
    pub fn plugin(&self) -> &'static str {
        match self {
            Self::StreamingDisabled { plugin } | Self::InvalidOptions { plugin, .. } => plugin,
        }
    }
}
