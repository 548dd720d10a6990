//! Error types for template compilation

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for template operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed underlying cause
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while compiling or rendering templates
///
/// Every variant records the operation that failed and, when known, the
/// template path involved.
#[derive(Error, Debug)]
pub enum Error {
    /// Template file could not be read or stat-ed
    #[error("{operation}: failed to read template {}: {source}", .path.display())]
    TemplateReadFailed {
        /// Operation that failed
        operation: &'static str,
        /// Template path
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },

    /// Template source has a syntax error or rendering failed
    #[error("{operation}: failed to compile template{}: {message}", describe_path(.path.as_deref()))]
    TemplateCompileFailed {
        /// Operation that failed
        operation: &'static str,
        /// Template path, if the template came from a file
        path: Option<PathBuf>,
        /// Error description
        message: String,
        /// Underlying engine error
        #[source]
        source: Option<Cause>,
    },

    /// The render context could not be sanitized
    #[error("{operation}: context rejected for template{}: {source}", describe_path(.path.as_deref()))]
    ContextSanitizationFailed {
        /// Operation that failed
        operation: &'static str,
        /// Template path, if the template came from a file
        path: Option<PathBuf>,
        /// Sanitizer error
        #[source]
        source: stencil_core::Error,
    },

    /// A nested value could not be sanitized
    #[error("{operation}: value rejected for template{}: {source}", describe_path(.path.as_deref()))]
    ObjectSanitizationFailed {
        /// Operation that failed
        operation: &'static str,
        /// Template path, if the template came from a file
        path: Option<PathBuf>,
        /// Sanitizer error
        #[source]
        source: stencil_core::Error,
    },

    /// The precompile batch itself failed (never a single file)
    #[error("{operation}: precompile batch aborted: {message}")]
    PrecompileFailed {
        /// Operation that failed
        operation: &'static str,
        /// Error description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Cause>,
    },
}

impl Error {
    /// Classify a sanitizer failure into the matching error kind
    pub fn sanitization(
        operation: &'static str,
        path: Option<&Path>,
        source: stencil_core::Error,
    ) -> Self {
        let path = path.map(Path::to_path_buf);
        match source {
            stencil_core::Error::ObjectSanitizationFailed { .. } => Self::ObjectSanitizationFailed {
                operation,
                path,
                source,
            },
            _ => Self::ContextSanitizationFailed {
                operation,
                path,
                source,
            },
        }
    }

    /// Build a [`Error::TemplateCompileFailed`] from an engine error
    pub fn compile(
        operation: &'static str,
        path: Option<&Path>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TemplateCompileFailed {
            operation,
            path: path.map(Path::to_path_buf),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Operation name recorded on the error
    pub fn operation(&self) -> &'static str {
        match self {
            Self::TemplateReadFailed { operation, .. }
            | Self::TemplateCompileFailed { operation, .. }
            | Self::ContextSanitizationFailed { operation, .. }
            | Self::ObjectSanitizationFailed { operation, .. }
            | Self::PrecompileFailed { operation, .. } => operation,
        }
    }

    /// Template path recorded on the error, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::TemplateReadFailed { path, .. } => Some(path),
            Self::TemplateCompileFailed { path, .. }
            | Self::ContextSanitizationFailed { path, .. }
            | Self::ObjectSanitizationFailed { path, .. } => path.as_deref(),
            Self::PrecompileFailed { .. } => None,
        }
    }
}

fn describe_path(path: Option<&Path>) -> String {
    path.map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}
