//! Error types for relpack-core

use thiserror::Error;

/// Errors that can occur in core operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File operation failed for '{path}': {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl CoreError {
    /// Attach the failing path to an IO error.
    pub(crate) fn file(path: &std::path::Path, source: std::io::Error) -> Self {
        CoreError::File {
            path: path.display().to_string(),
            source,
        }
    }
}
