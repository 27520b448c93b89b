//! In-memory backend
//!
//! Clones share the same map, so two stores built from clones of one
//! `MemoryBackend` see each other's writes the way two tabs share browser
//! storage. Reads and writes can be made to fail to simulate an
//! unavailable backend or an exceeded quota.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Backend, BackendError, BackendResult};

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

/// Backend that keeps blobs in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail with `Unavailable`
    pub fn fail_reads(&self, fail: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.fail_reads = fail;
        }
    }

    /// Make every subsequent `set`/`delete` fail with `QuotaExceeded`
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.fail_writes = fail;
        }
    }

    /// Check whether a key is present, bypassing failure simulation
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .lock()
            .map(|state| state.entries.contains_key(key))
            .unwrap_or(false)
    }

    /// Number of keys held
    pub fn len(&self) -> usize {
        self.inner.lock().map(|state| state.entries.len()).unwrap_or(0)
    }

    /// Whether no keys are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> BackendResult<MutexGuard<'_, MemoryState>> {
        self.inner
            .lock()
            .map_err(|_| BackendError::Unavailable("memory backend lock poisoned".to_string()))
    }
}

fn quota_error(key: &str) -> BackendError {
    BackendError::QuotaExceeded {
        path: PathBuf::from(key),
        source: io::Error::new(io::ErrorKind::Other, "quota exceeded"),
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let state = self.state()?;
        if state.fail_reads {
            return Err(BackendError::Unavailable(format!(
                "memory backend refused read of '{}'",
                key
            )));
        }
        Ok(state.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        let mut state = self.state()?;
        if state.fail_writes {
            return Err(quota_error(key));
        }
        state.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> BackendResult<()> {
        let mut state = self.state()?;
        if state.fail_writes {
            return Err(quota_error(key));
        }
        state.entries.remove(key);
        Ok(())
    }
}
