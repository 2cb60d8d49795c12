//! Typed errors for the normalization stage.
//!
//! Unlike the collection side, nothing here is fail-soft: by the time
//! batches reach this stage, a validation or I/O failure means the run
//! must abort with nothing persisted.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while normalizing and persisting output.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The assembled aggregate violates the output schema. Fatal.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// Filesystem operation failed
    #[error("{op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output could not be encoded
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    /// Reading raw batches back failed
    #[error("batch storage error: {0}")]
    Storage(#[from] harvest::StorageError),
}

impl NormalizeError {
    /// Attach path + operation context to a raw I/O error.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}

/// Result type alias for normalization operations.
pub type Result<T> = std::result::Result<T, NormalizeError>;
