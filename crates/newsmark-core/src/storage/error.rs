//! Backend error handling
//!
//! Typed errors for durable backend operations, with the failing key or
//! path attached and a recovery suggestion where one exists.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a durable backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or storage quota exceeded
    #[error("Storage quota exceeded while writing to '{path}'. Free up space and try again.")]
    QuotaExceeded {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read a blob
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a blob
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Atomic write failed during rename
    #[error("Atomic write failed: could not rename '{from}' to '{to}': {source}")]
    AtomicWriteFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Backend cannot be reached at all
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BackendError {
    /// Create a read error from an I/O error with path context
    pub fn read(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => BackendError::PermissionDenied {
                path,
                source: error,
            },
            _ => BackendError::ReadError {
                path,
                source: error,
            },
        }
    }

    /// Create a write error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => BackendError::PermissionDenied {
                path,
                source: error,
            },
            // StorageFull is not stable on every toolchain, so match the message too
            _ if is_quota_error(&error) => BackendError::QuotaExceeded {
                path,
                source: error,
            },
            _ => BackendError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BackendError::QuotaExceeded { .. } | BackendError::PermissionDenied { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            BackendError::QuotaExceeded { .. } => Some("Free up disk space and try again."),
            BackendError::PermissionDenied { .. } => {
                Some("Check file and directory permissions for the data directory.")
            }
            BackendError::Database(_) => {
                Some("The SQLite file may be locked by another process or damaged.")
            }
            BackendError::Unavailable(_) => {
                Some("Check the configured backend and data directory.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates a disk full or quota condition
fn is_quota_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
