//! File backend
//!
//! Stores each key as `<dir>/<key>.json`, with the key percent-encoded.
//! Writes go to a temporary file which is synced and then renamed over the
//! target, so a blob is never left half-written.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{Backend, BackendError, BackendResult};

/// Backend that keeps one file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `dir`
    ///
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the blobs
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::read(e, path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> BackendResult<()> {
        atomic_write(&self.path_for(key), value.as_bytes())
    }

    fn delete(&self, key: &str) -> BackendResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::from_io(e, path)),
        }
    }
}

/// Map a key onto a safe file stem
///
/// `[A-Za-z0-9._-]` is kept as is; every other byte, `%` included, is
/// written as `%XX`. The mapping is reversible, so distinct keys never
/// share a file, and a key can never escape the backend directory. A
/// leading `.` is escaped so no stem is `.`, `..` or hidden; the empty key
/// maps to a lone `%`, which no escape sequence produces.
fn file_stem(key: &str) -> String {
    if key.is_empty() {
        return "%".to_string();
    }

    let mut stem = String::with_capacity(key.len());
    for (i, byte) in key.bytes().enumerate() {
        let literal =
            byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') || (byte == b'.' && i > 0);
        if literal {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> BackendResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BackendError::from_io(e, parent.to_path_buf()))?;
    }

    let temp_path = path.with_extension("json.tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| BackendError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| BackendError::from_io(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| BackendError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| BackendError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_delete() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path());

        assert!(backend.get("newsmark_bookmarks").unwrap().is_none());

        backend.set("newsmark_bookmarks", "[]").unwrap();
        assert!(backend.path_for("newsmark_bookmarks").exists());
        assert_eq!(
            backend.get("newsmark_bookmarks").unwrap().as_deref(),
            Some("[]")
        );

        backend.delete("newsmark_bookmarks").unwrap();
        assert!(!backend.path_for("newsmark_bookmarks").exists());
        assert!(backend.get("newsmark_bookmarks").unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path());
        backend.delete("never-written").unwrap();
    }

    #[test]
    fn test_creates_directory_on_write() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let backend = FileBackend::new(&nested);

        backend.set("key", "data").unwrap();

        assert!(nested.join("key.json").exists());
        assert!(!nested.join("key.json.tmp").exists());
    }

    #[test]
    fn test_overwrite_replaces_contents() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path());

        backend.set("key", "a much longer first value").unwrap();
        backend.set("key", "short").unwrap();

        assert_eq!(backend.get("key").unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn test_keys_cannot_escape_directory() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path());

        let path = backend.path_for("../../etc/passwd");
        assert_eq!(path.parent().unwrap(), temp_dir.path());
        assert_eq!(file_stem(".."), "%2E.");
        assert_eq!(file_stem("."), "%2E");
        assert_eq!(file_stem(""), "%");
        assert_eq!(file_stem("news/saved"), "news%2Fsaved");
        assert_eq!(file_stem("newsmark_bookmarks"), "newsmark_bookmarks");
    }

    #[test]
    fn test_similar_keys_stay_independent() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path());
        let keys = [
            "news bookmarks",
            "news/bookmarks",
            "news_bookmarks",
            "news%20bookmarks",
            "news\\bookmarks",
            "nëws_bookmarks",
        ];

        for (i, key) in keys.iter().enumerate() {
            backend.set(key, &format!("[{}]", i)).unwrap();
        }

        for (i, key) in keys.iter().enumerate() {
            assert_eq!(backend.get(key).unwrap(), Some(format!("[{}]", i)), "{}", key);
            assert_eq!(backend.path_for(key).parent().unwrap(), temp_dir.path());
        }

        backend.delete("news bookmarks").unwrap();
        assert!(backend.get("news bookmarks").unwrap().is_none());
        assert_eq!(backend.get("news_bookmarks").unwrap().as_deref(), Some("[2]"));
    }
}
