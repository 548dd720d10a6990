//! Error types for stencil-core

use std::fmt;

use thiserror::Error;

/// Result type alias for stencil-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a piece of text was rejected by the sanitizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRejection {
    /// Nothing was left once control characters and whitespace were removed
    Empty,
    /// Input exceeded the maximum accepted length
    TooLong {
        /// Length of the input in characters
        len: usize,
        /// Maximum accepted length in characters
        max: usize,
    },
}

impl fmt::Display for TextRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("text is empty after sanitization"),
            Self::TooLong { len, max } => {
                write!(f, "text is {} characters long (maximum {})", len, max)
            }
        }
    }
}

/// Errors that can occur in stencil-core
#[derive(Error, Debug)]
pub enum Error {
    /// Text could not be sanitized
    #[error("invalid text: {reason}")]
    InvalidText {
        /// Why the text was rejected
        reason: TextRejection,
    },

    /// A value nested inside an object or array could not be sanitized
    #[error("failed to sanitize value at '{pointer}': {source}")]
    ObjectSanitizationFailed {
        /// JSON pointer of the offending value
        pointer: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// A top-level template context entry could not be sanitized
    #[error("failed to sanitize context key '{key}': {source}")]
    ContextSanitizationFailed {
        /// Top-level context key
        key: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// The template context was not a key/value mapping
    #[error("template context must be an object, got {kind}")]
    ContextNotAnObject {
        /// JSON type of the supplied context
        kind: &'static str,
    },

    /// Configuration file could not be found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse YAML configuration
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidText`]
    pub fn invalid_text(reason: TextRejection) -> Self {
        Self::InvalidText { reason }
    }
}
