//! Typed errors for the collection side of the pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Expected field-resolution misses are *not* errors — they are `Option`
//! values. Only conditions that must abort an item or the whole run are
//! represented here.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a collection run.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Document accessor operation failed
    #[error("document access failed: {0}")]
    Access(#[from] AccessError),

    /// Batch or session storage failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Source configuration is invalid
    #[error("invalid source config: {reason}")]
    Config { reason: String },
}

/// Errors raised by a document accessor.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Navigation to a URL failed
    #[error("navigation failed: {url}: {reason}")]
    Navigation { url: String, reason: String },

    /// HTTP transport failure (connection, timeout)
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success HTTP status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Click target could not be activated
    #[error("click failed: {target}")]
    Click { target: String },

    /// No document is currently loaded
    #[error("no document loaded")]
    NoDocument,

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors raised by batch/session persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("{op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Refusing to overwrite an existing batch file
    #[error("batch {number} already exists in {session_dir}")]
    BatchExists { number: u32, session_dir: PathBuf },

    /// Batch file contents could not be decoded
    #[error("corrupt batch file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Batch could not be encoded for writing
    #[error("failed to encode batch {number}: {source}")]
    Encode {
        number: u32,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Attach path + operation context to a raw I/O error.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by attachment downloads.
///
/// Never bubbles past the item that owns the attachment: transient
/// failures are retried, terminal ones are logged and the file recorded
/// as absent.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level failure; transient, worth retrying
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success HTTP status; terminal for this document
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

impl DownloadError {
    /// Whether retrying can plausibly help.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type alias for collection operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for accessor operations.
pub type AccessResult<T> = std::result::Result<T, AccessError>;

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Result type alias for download operations.
pub type DownloadResult<T> = std::result::Result<T, DownloadError>;
