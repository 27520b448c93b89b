//! Blob lifecycle shared by the stores
//!
//! Each store owns one JSON blob under one backend key. It reads the blob
//! once (hydration) and rewrites it whole after every mutation. Failures on
//! either side are never returned to the caller: they are logged, handed to
//! the store's error channel, and the in-memory state stays authoritative.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::BookmarkError;
use crate::storage::Backend;

/// Lifecycle of a store instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Constructed, backend not read yet
    Uninitialized,
    /// Reading and parsing the durable blob
    Hydrating,
    /// Collection loaded (or reset after a failed load)
    Ready,
}

type ErrorCallback = Box<dyn FnMut(&BookmarkError) + Send>;

/// Where swallowed errors go
///
/// Keeps the most recent error and forwards each one to an optional
/// host callback.
#[derive(Default)]
pub(crate) struct ErrorChannel {
    last: Option<BookmarkError>,
    callback: Option<ErrorCallback>,
}

impl ErrorChannel {
    pub(crate) fn report(&mut self, err: BookmarkError) {
        warn!("{}", err);
        if let Some(callback) = self.callback.as_mut() {
            callback(&err);
        }
        self.last = Some(err);
    }

    pub(crate) fn last(&self) -> Option<&BookmarkError> {
        self.last.as_ref()
    }

    pub(crate) fn take(&mut self) -> Option<BookmarkError> {
        self.last.take()
    }

    pub(crate) fn set_callback(&mut self, callback: ErrorCallback) {
        self.callback = Some(callback);
    }
}

/// Read and parse the blob under `key`
///
/// Returns `None` when the key is absent or unusable. An unreadable or
/// malformed blob is reported and then deleted so the next session starts
/// clean.
pub(crate) fn hydrate<T, B>(backend: &B, key: &str, errors: &mut ErrorChannel) -> Option<T>
where
    T: DeserializeOwned,
    B: Backend + ?Sized,
{
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No stored data under '{}'", key);
            return None;
        }
        Err(source) => {
            errors.report(BookmarkError::HydrationRead {
                key: key.to_string(),
                source,
            });
            discard(backend, key);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => {
            debug!("Hydrated '{}' ({} bytes)", key, raw.len());
            Some(value)
        }
        Err(source) => {
            errors.report(BookmarkError::HydrationParse {
                key: key.to_string(),
                source,
            });
            discard(backend, key);
            None
        }
    }
}

/// Serialize `value` and overwrite the blob under `key`
pub(crate) fn write<T, B>(backend: &B, key: &str, value: &T, errors: &mut ErrorChannel)
where
    T: Serialize + ?Sized,
    B: Backend + ?Sized,
{
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(source) => {
            errors.report(BookmarkError::Serialize {
                key: key.to_string(),
                source,
            });
            return;
        }
    };

    match backend.set(key, &json) {
        Ok(()) => debug!("Persisted '{}' ({} bytes)", key, json.len()),
        Err(source) => errors.report(BookmarkError::Persistence {
            key: key.to_string(),
            source,
        }),
    }
}

/// Delete the blob under `key`
pub(crate) fn remove<B>(backend: &B, key: &str, errors: &mut ErrorChannel)
where
    B: Backend + ?Sized,
{
    match backend.delete(key) {
        Ok(()) => debug!("Deleted '{}'", key),
        Err(source) => errors.report(BookmarkError::Persistence {
            key: key.to_string(),
            source,
        }),
    }
}

fn discard<B: Backend + ?Sized>(backend: &B, key: &str) {
    if let Err(e) = backend.delete(key) {
        warn!("Could not discard unusable data under '{}': {}", key, e);
    }
}
