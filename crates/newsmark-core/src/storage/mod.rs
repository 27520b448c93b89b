//! Durable backends
//!
//! A backend is a key-value store addressed by string keys holding string
//! blobs. The bookmark and preferences stores read a backend once at
//! startup and rewrite their whole blob after every mutation.
//!
//! ## Implementations
//!
//! - **MemoryBackend**: shared in-process map, used in tests and for
//!   throwaway sessions
//! - **FileBackend**: one JSON file per key, written atomically
//! - **SqliteBackend**: a single key-value table in an SQLite file
//!
//! Creating or deleting the underlying medium (directory, database file)
//! is the caller's job; backends only manage entries under a key.

pub mod error;
pub mod file;
pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use tracing::debug;

use crate::config::{BackendKind, Config};

pub use error::{BackendError, BackendResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Key-value storage for serialized blobs
pub trait Backend {
    /// Read the blob stored under `key`, `None` if absent
    fn get(&self, key: &str) -> BackendResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous blob
    fn set(&self, key: &str, value: &str) -> BackendResult<()>;

    /// Remove `key` entirely. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> BackendResult<()>;
}

impl<T: Backend + ?Sized> Backend for &T {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> BackendResult<()> {
        (**self).delete(key)
    }
}

impl<T: Backend + ?Sized> Backend for Box<T> {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> BackendResult<()> {
        (**self).delete(key)
    }
}

impl<T: Backend + ?Sized> Backend for Arc<T> {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> BackendResult<()> {
        (**self).delete(key)
    }
}

/// Open the backend selected by the configuration
pub fn open_backend(config: &Config) -> BackendResult<Box<dyn Backend>> {
    debug!("Opening {} backend in {:?}", config.backend, config.data_dir);
    let backend: Box<dyn Backend> = match config.backend {
        BackendKind::File => Box::new(FileBackend::new(config.data_dir.clone())),
        BackendKind::Sqlite => Box::new(SqliteBackend::open(&config.sqlite_path())?),
        BackendKind::Memory => Box::new(MemoryBackend::new()),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir, backend: BackendKind) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            backend,
            ..Config::default()
        }
    }

    fn exercise(backend: &dyn Backend) {
        assert_eq!(backend.get("k").unwrap(), None);
        backend.set("k", "[1,2]").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("[1,2]"));
        backend.set("k", "[]").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("[]"));
        backend.delete("k").unwrap();
        assert_eq!(backend.get("k").unwrap(), None);
        // Deleting twice is fine
        backend.delete("k").unwrap();
    }

    #[test]
    fn test_open_backend_file() {
        let temp_dir = TempDir::new().unwrap();
        let backend = open_backend(&test_config(&temp_dir, BackendKind::File)).unwrap();
        exercise(backend.as_ref());
    }

    #[test]
    fn test_open_backend_sqlite() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir, BackendKind::Sqlite);
        let backend = open_backend(&config).unwrap();
        exercise(backend.as_ref());
        assert!(config.sqlite_path().exists());
    }

    #[test]
    fn test_open_backend_memory() {
        let temp_dir = TempDir::new().unwrap();
        let backend = open_backend(&test_config(&temp_dir, BackendKind::Memory)).unwrap();
        exercise(backend.as_ref());
    }

    #[test]
    fn test_shared_arc_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let other = Arc::clone(&backend);
        backend.set("shared", "x").unwrap();
        assert_eq!(other.get("shared").unwrap().as_deref(), Some("x"));
    }
}
