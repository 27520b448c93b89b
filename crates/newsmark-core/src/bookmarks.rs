//! Bookmark store
//!
//! Keeps an ordered collection of bookmarked items in memory and mirrors it
//! to a durable backend under a single key.
//!
//! ## Lifecycle
//!
//! A store starts `Uninitialized`. [`BookmarkStore::hydrate`] (or
//! [`BookmarkStore::open`]) loads the stored collection and moves it to
//! `Ready`; a missing, unreadable or malformed blob yields an empty
//! collection instead of an error. Mutations hydrate first if needed, so a
//! write can never clobber data that was not loaded yet. Queries on a store
//! that is not ready see an empty collection; check
//! [`BookmarkStore::is_ready`] before rendering.
//!
//! ## Persistence
//!
//! Every mutation rewrites the entire collection (`clear` deletes the key),
//! including a `remove` that matched nothing.
//! Backend failures are logged and reported through
//! [`BookmarkStore::last_error`] and the [`BookmarkStore::on_error`]
//! callback; the in-memory collection stays authoritative.
//!
//! ## Duplicates
//!
//! `add` appends unconditionally, even when the identity is already saved.
//! `remove` and `toggle` act on every item sharing the identity, so one
//! toggle clears all duplicates.
//!
//! A store is not synchronized. Hosts that mutate one collection from
//! several threads wrap the store in a mutex, or call
//! [`BookmarkStore::reload`] after an external change.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = NewsStore::open(FileBackend::new(dir), "newsmark_bookmarks");
//!
//! store.add(article.into_bookmark())?;
//! assert!(store.is_saved("https://example.com/story"));
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::blob::{self, ErrorChannel, StoreState};
use crate::error::{BookmarkError, BookmarkResult};
use crate::models::{Article, BookmarkedItem, NewBookmark, Toggled};
use crate::storage::Backend;

/// Bookmark store holding news articles
pub type NewsStore<B> = BookmarkStore<Article, B>;

/// Ordered, timestamped collection mirrored to a backend
pub struct BookmarkStore<P, B> {
    backend: B,
    key: String,
    state: StoreState,
    items: Vec<BookmarkedItem<P>>,
    errors: ErrorChannel,
}

impl<P, B> BookmarkStore<P, B>
where
    P: Serialize + DeserializeOwned,
    B: Backend,
{
    /// Create a store without touching the backend
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            state: StoreState::Uninitialized,
            items: Vec::new(),
            errors: ErrorChannel::default(),
        }
    }

    /// Create a store and hydrate it immediately
    pub fn open(backend: B, key: impl Into<String>) -> Self {
        let mut store = Self::new(backend, key);
        store.hydrate();
        store
    }

    /// Load the collection from the backend
    ///
    /// Does nothing once the store is ready.
    pub fn hydrate(&mut self) {
        if self.state != StoreState::Uninitialized {
            return;
        }

        self.state = StoreState::Hydrating;
        let loaded: Vec<BookmarkedItem<P>> =
            blob::hydrate(&self.backend, &self.key, &mut self.errors).unwrap_or_default();

        let before = loaded.len();
        self.items = loaded
            .into_iter()
            .filter(|item| !item.identity().trim().is_empty())
            .collect();
        if self.items.len() != before {
            warn!(
                "Dropped {} stored item(s) without an identity from '{}'",
                before - self.items.len(),
                self.key
            );
        }

        self.state = StoreState::Ready;
        debug!("Bookmark store '{}' ready with {} item(s)", self.key, self.items.len());
    }

    /// Throw away the in-memory collection and hydrate again
    pub fn reload(&mut self) {
        self.state = StoreState::Uninitialized;
        self.items.clear();
        self.hydrate();
    }

    fn ensure_ready(&mut self) {
        if self.state != StoreState::Ready {
            self.hydrate();
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Whether hydration has finished
    pub fn is_ready(&self) -> bool {
        self.state == StoreState::Ready
    }

    /// Backend key the collection lives under
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ==================== Mutations ====================

    /// Append an item, stamping it with the current time
    ///
    /// Fails only when the identity is empty. A failed write is reported
    /// through the error channel, not returned.
    pub fn add(&mut self, item: NewBookmark<P>) -> BookmarkResult<&BookmarkedItem<P>> {
        let identity = validate_identity(&item.identity)?.to_string();
        self.ensure_ready();

        self.items.push(BookmarkedItem::stamp(identity, item.payload));
        self.persist();

        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Shorthand for `add(NewBookmark::new(identity, payload))`
    pub fn add_item(
        &mut self,
        identity: impl Into<String>,
        payload: P,
    ) -> BookmarkResult<&BookmarkedItem<P>> {
        self.add(NewBookmark::new(identity, payload))
    }

    /// Drop every item with this identity, returning how many went
    ///
    /// The collection is rewritten even when nothing matched, which also
    /// retries an earlier failed write.
    pub fn remove(&mut self, identity: &str) -> usize {
        self.ensure_ready();

        let identity = identity.trim();
        let before = self.items.len();
        self.items.retain(|item| item.identity() != identity);
        let removed = before - self.items.len();

        self.persist();
        removed
    }

    /// Remove the item if saved, add it otherwise
    pub fn toggle(&mut self, item: NewBookmark<P>) -> BookmarkResult<Toggled> {
        validate_identity(&item.identity)?;
        self.ensure_ready();

        if self.is_saved(&item.identity) {
            self.remove(&item.identity);
            Ok(Toggled::Removed)
        } else {
            self.add(item)?;
            Ok(Toggled::Added)
        }
    }

    /// Empty the collection and delete the stored blob
    pub fn clear(&mut self) {
        self.ensure_ready();

        let count = self.items.len();
        self.items.clear();
        blob::remove(&self.backend, &self.key, &mut self.errors);
        info!("Cleared {} bookmark(s) from '{}'", count, self.key);
    }

    // ==================== Queries ====================

    /// Whether any item carries this identity
    pub fn is_saved(&self, identity: &str) -> bool {
        let identity = identity.trim();
        self.items.iter().any(|item| item.identity() == identity)
    }

    /// First item with this identity
    pub fn get(&self, identity: &str) -> Option<&BookmarkedItem<P>> {
        let identity = identity.trim();
        self.items.iter().find(|item| item.identity() == identity)
    }

    /// Number of items, duplicates included
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in insertion order
    pub fn all(&self) -> &[BookmarkedItem<P>] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookmarkedItem<P>> {
        self.items.iter()
    }

    // ==================== Errors ====================

    /// Most recent hydration or persistence failure
    pub fn last_error(&self) -> Option<&BookmarkError> {
        self.errors.last()
    }

    /// Take the most recent failure, clearing it
    pub fn take_last_error(&mut self) -> Option<BookmarkError> {
        self.errors.take()
    }

    /// Call `callback` with every swallowed failure from now on
    pub fn on_error(&mut self, callback: impl FnMut(&BookmarkError) + Send + 'static) {
        self.errors.set_callback(Box::new(callback));
    }

    fn persist(&mut self) {
        blob::write(&self.backend, &self.key, &self.items, &mut self.errors);
    }
}

fn validate_identity(identity: &str) -> BookmarkResult<&str> {
    let identity = identity.trim();
    if identity.is_empty() {
        return Err(BookmarkError::MissingIdentity);
    }
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::preferences::PreferencesStore;
    use crate::storage::{FileBackend, MemoryBackend, SqliteBackend};
    use chrono::Utc;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    const KEY: &str = "newsmark_bookmarks";

    fn open(backend: &MemoryBackend) -> BookmarkStore<Value, MemoryBackend> {
        BookmarkStore::open(backend.clone(), KEY)
    }

    fn titled(identity: &str, title: &str) -> NewBookmark<Value> {
        NewBookmark::new(identity, json!({ "title": title }))
    }

    fn identities<P>(store: &BookmarkStore<P, MemoryBackend>) -> Vec<&str>
    where
        P: Serialize + DeserializeOwned,
    {
        store.iter().map(|item| item.identity()).collect()
    }

    #[test]
    fn test_lifecycle() {
        let backend = MemoryBackend::new();
        let mut store: BookmarkStore<Value, _> = BookmarkStore::new(backend, KEY);

        assert_eq!(store.state(), StoreState::Uninitialized);
        assert!(!store.is_ready());

        store.hydrate();
        assert_eq!(store.state(), StoreState::Ready);
        assert!(store.is_ready());
        assert!(store.is_empty());
        assert!(store.last_error().is_none());
    }

    #[test]
    fn test_mutation_hydrates_before_writing() {
        let backend = MemoryBackend::new();
        open(&backend).add(titled("u1", "A")).unwrap();

        // Never hydrated explicitly; add must not overwrite u1
        let mut store: BookmarkStore<Value, _> = BookmarkStore::new(backend.clone(), KEY);
        store.add(titled("u2", "B")).unwrap();

        assert!(store.is_ready());
        assert_eq!(identities(&store), vec!["u1", "u2"]);
        assert_eq!(open(&backend).count(), 2);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);

        for id in ["a", "b", "c", "d"] {
            store.add(titled(id, id)).unwrap();
        }
        assert!(store.is_saved("b"));
        assert!(store.get("zzz").is_none());

        assert_eq!(identities(&store), vec!["a", "b", "c", "d"]);
        assert_eq!(identities(&open(&backend)), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_remove_scenario() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);

        store.add(titled("u1", "A")).unwrap();
        store.add(titled("u2", "B")).unwrap();
        assert_eq!(store.remove("u1"), 1);

        assert_eq!(store.count(), 1);
        assert_eq!(identities(&store), vec!["u2"]);
        assert_eq!(store.all()[0].payload()["title"], "B");
        assert!(!store.is_saved("u1"));
    }

    #[test]
    fn test_remove_keeps_survivor_order() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);

        for id in ["a", "b", "c", "d"] {
            store.add(titled(id, id)).unwrap();
        }
        store.remove("b");

        assert_eq!(identities(&store), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_remove_missing_still_rewrites() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);

        assert_eq!(store.remove("nothing"), 0);
        assert_eq!(backend.get(KEY).unwrap().as_deref(), Some("[]"));
        assert!(store.last_error().is_none());
    }

    #[test]
    fn test_remove_retries_failed_write() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);

        backend.fail_writes(true);
        store.add(titled("u1", "A")).unwrap();
        assert!(store.take_last_error().is_some());
        assert!(!backend.contains(KEY));

        backend.fail_writes(false);
        assert_eq!(store.remove("nothing"), 0);
        assert!(store.last_error().is_none());
        assert_eq!(identities(&open(&backend)), vec!["u1"]);
    }

    #[test]
    fn test_toggle_round_trip() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);
        store.add(titled("keep", "K")).unwrap();

        assert_eq!(store.toggle(titled("x", "X")).unwrap(), Toggled::Added);
        assert!(store.is_saved("x"));

        assert_eq!(store.toggle(titled("x", "X")).unwrap(), Toggled::Removed);
        assert!(!store.is_saved("x"));
        assert_eq!(identities(&store), vec!["keep"]);

        // And from the saved side
        assert_eq!(store.toggle(titled("keep", "K")).unwrap(), Toggled::Removed);
        assert_eq!(store.toggle(titled("keep", "K")).unwrap(), Toggled::Added);
        assert!(store.is_saved("keep"));
    }

    #[test]
    fn test_clear_deletes_key() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);
        store.add(titled("u1", "A")).unwrap();
        assert!(backend.contains(KEY));

        store.clear();
        assert!(store.is_empty());
        assert!(!backend.contains(KEY));

        let fresh = open(&backend);
        assert!(fresh.is_ready());
        assert_eq!(fresh.count(), 0);
    }

    #[test]
    fn test_persistence_round_trip() {
        let backend = MemoryBackend::new();
        let before = Utc::now();
        let payload = json!({
            "title": "A",
            "source": { "name": "Wire" },
            "tags": ["x", "y"]
        });

        {
            let mut store = open(&backend);
            store.add(NewBookmark::new("u1", payload.clone())).unwrap();
        }

        let fresh = open(&backend);
        let item = fresh.get("u1").unwrap();
        assert_eq!(item.identity(), "u1");
        assert_eq!(item.payload(), &payload);
        assert!(item.saved_at() >= before);
        assert!(item.saved_at() <= Utc::now());
    }

    #[test]
    fn test_saved_at_is_stamped_and_stable() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);

        let first = store.add(titled("u1", "A")).unwrap().saved_at();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.add(titled("u2", "B")).unwrap();
        store.remove("u2");

        assert_eq!(store.get("u1").unwrap().saved_at(), first);
        assert_eq!(open(&backend).get("u1").unwrap().saved_at(), first);
    }

    #[test]
    fn test_corrupt_blob_resets_to_empty() {
        let backend = MemoryBackend::new();
        backend.set(KEY, r#"[{"identity":"u1","payload":{"ti"#).unwrap();

        let store = open(&backend);
        assert!(store.is_ready());
        assert!(store.is_empty());
        assert_eq!(store.last_error().unwrap().kind(), ErrorKind::Hydration);
        // The malformed blob is gone
        assert!(!backend.contains(KEY));
    }

    #[test]
    fn test_wrong_shape_blob_resets_to_empty() {
        let backend = MemoryBackend::new();
        backend.set(KEY, r#"{"not": "an array"}"#).unwrap();

        let store = open(&backend);
        assert!(store.is_ready());
        assert!(store.is_empty());
        assert!(matches!(
            store.last_error(),
            Some(BookmarkError::HydrationParse { .. })
        ));
    }

    #[test]
    fn test_unreadable_backend_still_ready() {
        let backend = MemoryBackend::new();
        backend.fail_reads(true);

        let mut store = open(&backend);
        assert!(store.is_ready());
        assert!(matches!(
            store.take_last_error(),
            Some(BookmarkError::HydrationRead { .. })
        ));

        // Still usable afterwards
        backend.fail_reads(false);
        store.add(titled("u1", "A")).unwrap();
        assert_eq!(open(&backend).count(), 1);
    }

    #[test]
    fn test_stored_items_without_identity_are_dropped() {
        let backend = MemoryBackend::new();
        let now = Utc::now().to_rfc3339();
        let blob = format!(
            r#"[{{"identity":"  ","payload":1,"savedAt":"{now}"}},{{"identity":"ok","payload":2,"savedAt":"{now}"}}]"#
        );
        backend.set(KEY, &blob).unwrap();

        let store = open(&backend);
        assert_eq!(identities(&store), vec!["ok"]);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);
        store.add(titled("u1", "A")).unwrap();

        backend.fail_writes(true);
        store.add(titled("u2", "B")).unwrap();
        store.remove("u1");
        store.clear();
        store.add(titled("u3", "C")).unwrap();

        assert_eq!(identities(&store), vec!["u3"]);
        assert_eq!(store.last_error().unwrap().kind(), ErrorKind::Persistence);

        // Durable copy is whatever last succeeded
        backend.fail_writes(false);
        assert_eq!(identities(&open(&backend)), vec!["u1"]);
    }

    #[test]
    fn test_on_error_callback() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.on_error(move |err| sink.lock().unwrap().push(err.to_string()));

        backend.fail_writes(true);
        store.add(titled("u1", "A")).unwrap();
        store.clear();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains(KEY));
    }

    #[test]
    fn test_missing_identity_rejected() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);

        let err = store.add(titled("", "A")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(matches!(err, BookmarkError::MissingIdentity));

        let err = store.toggle(titled("   ", "A")).unwrap_err();
        assert!(matches!(err, BookmarkError::MissingIdentity));

        assert!(store.is_empty());
        assert!(!backend.contains(KEY));
        // Rejections are returned, not routed to the error channel
        assert!(store.last_error().is_none());
    }

    #[test]
    fn test_identity_is_trimmed() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);

        store.add(titled("  u1 ", "A")).unwrap();
        assert_eq!(store.all()[0].identity(), "u1");
        assert!(store.is_saved("u1"));
        assert!(store.is_saved(" u1"));
    }

    #[test]
    fn test_add_duplicate_identity_appends() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);

        store.add(titled("u1", "first")).unwrap();
        store.add(titled("u1", "second")).unwrap();

        assert_eq!(store.count(), 2);
        assert_eq!(identities(&store), vec!["u1", "u1"]);
        // get returns the earliest entry
        assert_eq!(store.get("u1").unwrap().payload()["title"], "first");
        assert_eq!(open(&backend).count(), 2);
    }

    #[test]
    fn test_duplicates_removed_together() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);

        store.add(titled("u1", "first")).unwrap();
        store.add(titled("u2", "other")).unwrap();
        store.add(titled("u1", "second")).unwrap();

        assert_eq!(store.remove("u1"), 2);
        assert_eq!(identities(&store), vec!["u2"]);

        store.add(titled("u2", "again")).unwrap();
        assert_eq!(store.toggle(titled("u2", "x")).unwrap(), Toggled::Removed);
        assert!(store.is_empty());
    }

    #[test]
    fn test_reload_picks_up_external_changes() {
        let backend = MemoryBackend::new();
        let mut tab_a = open(&backend);
        let mut tab_b = open(&backend);

        tab_a.add(titled("u1", "A")).unwrap();
        assert!(!tab_b.is_saved("u1"));

        tab_b.reload();
        assert!(tab_b.is_saved("u1"));

        tab_b.add(titled("u2", "B")).unwrap();
        tab_a.reload();
        assert_eq!(identities(&tab_a), vec!["u1", "u2"]);
    }

    #[test]
    fn test_news_store_on_file_backend() {
        let temp_dir = TempDir::new().unwrap();

        let mut article = Article::new("https://news.example/story");
        article.title = "Story".to_string();
        article.source.name = "Example News".to_string();

        {
            let mut store: NewsStore<_> =
                BookmarkStore::open(FileBackend::new(temp_dir.path()), KEY);
            store.add(article.clone().into_bookmark()).unwrap();
        }

        let store: NewsStore<_> = BookmarkStore::open(FileBackend::new(temp_dir.path()), KEY);
        let saved = store.get("https://news.example/story").unwrap();
        assert_eq!(saved.payload(), &article);
        assert!(store.last_error().is_none());
    }

    #[test]
    fn test_stores_share_sqlite_backend() {
        let backend = Arc::new(SqliteBackend::open_in_memory().unwrap());

        let mut writer: NewsStore<_> = BookmarkStore::open(Arc::clone(&backend), KEY);
        writer
            .add(Article::new("https://a.example").into_bookmark())
            .unwrap();

        let reader: NewsStore<_> = BookmarkStore::open(Arc::clone(&backend), KEY);
        assert!(reader.is_saved("https://a.example"));
    }

    #[test]
    fn test_stored_json_shape() {
        let backend = MemoryBackend::new();
        let mut store = open(&backend);
        store.add(titled("u1", "A")).unwrap();

        let raw = backend.get(KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["identity"], "u1");
        assert_eq!(entries[0]["payload"]["title"], "A");
        assert!(entries[0]["savedAt"].as_str().is_some());
    }

    #[test]
    fn test_lookalike_keys_do_not_share_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileBackend::new(temp_dir.path());

        let mut bookmarks: BookmarkStore<Value, _> = BookmarkStore::open(&backend, "news bookmarks");
        bookmarks.add(titled("u1", "A")).unwrap();

        let mut prefs = PreferencesStore::open(&backend, "news_bookmarks");
        prefs.mark_as_read("x").unwrap();
        assert!(prefs.last_error().is_none());

        let fresh: BookmarkStore<Value, _> = BookmarkStore::open(&backend, "news bookmarks");
        assert!(fresh.last_error().is_none());
        assert_eq!(fresh.count(), 1);
    }
}
