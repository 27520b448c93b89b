//! Store errors
//!
//! Three classes of failure, told apart by [`BookmarkError::kind`]:
//! hydration (backend unreadable or blob unparsable), persistence (backend
//! unwritable or value unserializable), and invariant violations rejected
//! at the call boundary. Only the last is ever returned to a caller; the
//! first two are recovered inside the store and reported through its
//! error channel.

use thiserror::Error;

use crate::storage::BackendError;

/// Errors raised by the bookmark and preferences stores
#[derive(Error, Debug)]
pub enum BookmarkError {
    /// Backend could not be read during hydration
    #[error("Failed to read '{key}' from the backend: {source}")]
    HydrationRead {
        key: String,
        #[source]
        source: BackendError,
    },

    /// Stored blob is not valid for this store
    #[error("Stored data under '{key}' is malformed and was discarded: {source}")]
    HydrationParse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Backend rejected a write or delete
    #[error("Failed to persist '{key}': {source}")]
    Persistence {
        key: String,
        #[source]
        source: BackendError,
    },

    /// In-memory state could not be serialized
    #[error("Failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Caller passed an item without a usable identity
    #[error("Item rejected: identity must not be empty")]
    MissingIdentity,

    /// Caller passed a blank value where one is required
    #[error("{field} must not be empty")]
    EmptyValue { field: &'static str },
}

/// Broad class of a [`BookmarkError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Hydration,
    Persistence,
    InvariantViolation,
}

impl BookmarkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookmarkError::HydrationRead { .. } | BookmarkError::HydrationParse { .. } => {
                ErrorKind::Hydration
            }
            BookmarkError::Persistence { .. } | BookmarkError::Serialize { .. } => {
                ErrorKind::Persistence
            }
            BookmarkError::MissingIdentity | BookmarkError::EmptyValue { .. } => {
                ErrorKind::InvariantViolation
            }
        }
    }

    /// Backend-level recovery hint, if there is one
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            BookmarkError::HydrationRead { source, .. }
            | BookmarkError::Persistence { source, .. } => source.recovery_suggestion(),
            BookmarkError::HydrationParse { .. } => {
                Some("The stored data was unreadable and has been reset.")
            }
            _ => None,
        }
    }
}

/// Result type for store operations
pub type BookmarkResult<T> = Result<T, BookmarkError>;
