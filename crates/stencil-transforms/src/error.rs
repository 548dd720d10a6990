//! Error types for source transforms

use std::path::PathBuf;

use thiserror::Error;

/// Result type for transform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while transforming source
#[derive(Error, Debug)]
pub enum Error {
    /// Source could not be parsed
    #[error("parse error: {message}")]
    Parse {
        /// Parser diagnostic
        message: String,
    },

    /// Source file could not be read or written
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },
}
