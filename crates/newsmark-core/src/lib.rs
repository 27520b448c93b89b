//! newsmark core library
//!
//! Local persistence for a news reader: the articles a visitor bookmarks
//! and their reading preferences. Nothing here talks to the network; the
//! stores keep state in memory and mirror it to a pluggable durable
//! backend.
//!
//! # Quick Start
//!
//! ```text
//! let backend = FileBackend::new(config.data_dir.clone());
//! let mut store = NewsStore::open(backend, &config.storage_key);
//!
//! // Save an article
//! let mut article = Article::new("https://example.com/story");
//! article.title = "Example".into();
//! store.add(article.into_bookmark())?;
//!
//! // Query
//! assert!(store.is_saved("https://example.com/story"));
//! ```
//!
//! # Modules
//!
//! - `bookmarks`: bookmark store (main entry point)
//! - `preferences`: reader preferences store
//! - `models`: bookmarked items and the article payload
//! - `storage`: durable backends (memory, file, SQLite)
//! - `error`: store error taxonomy
//! - `config`: application configuration

mod blob;
pub mod bookmarks;
pub mod config;
pub mod error;
pub mod models;
pub mod preferences;
pub mod storage;

pub use blob::StoreState;
pub use bookmarks::{BookmarkStore, NewsStore};
pub use config::{BackendKind, Config};
pub use error::{BookmarkError, BookmarkResult, ErrorKind};
pub use models::{Article, ArticleSource, BookmarkedItem, NewBookmark, Toggled};
pub use preferences::{Preferences, PreferencesPatch, PreferencesStore, Theme};
pub use storage::{open_backend, Backend, BackendError, FileBackend, MemoryBackend, SqliteBackend};
