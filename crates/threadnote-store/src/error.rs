//! Error types for snapshot loading and saving.

use std::path::PathBuf;
use thiserror::Error;
use threadnote_core::LookupError;

/// Errors that can occur while reading or writing a snapshot.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read from file system.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to file system.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to (de)serialize JSON.
    #[error("failed to serialize: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Snapshot contents are inconsistent.
    #[error("invalid snapshot: {0}")]
    InvalidData(String),

    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<StoreError> for LookupError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::LockPoisoned(msg) => LookupError::LockPoisoned(msg),
            other => LookupError::Unavailable(other.to_string()),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
