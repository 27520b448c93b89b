//! Reader preferences
//!
//! Favourite categories, read articles, theme and language, kept under
//! their own backend key with the same hydrate-once, write-through and
//! swallow-and-report behaviour as the bookmark store.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::blob::{self, ErrorChannel, StoreState};
use crate::error::{BookmarkError, BookmarkResult};
use crate::storage::Backend;

/// Colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => bail!("Unknown theme '{}'. Use 'light' or 'dark'.", other),
        }
    }
}

/// Stored reader preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub favorite_categories: Vec<String>,
    pub read_articles: Vec<String>,
    pub theme: Theme,
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            favorite_categories: Vec::new(),
            read_articles: Vec::new(),
            theme: Theme::Light,
            language: "en".to_string(),
        }
    }
}

/// Partial update; `None` fields are left as they are
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferencesPatch {
    pub favorite_categories: Option<Vec<String>>,
    pub read_articles: Option<Vec<String>>,
    pub theme: Option<Theme>,
    pub language: Option<String>,
}

impl Preferences {
    fn apply(&mut self, patch: PreferencesPatch) {
        if let Some(categories) = patch.favorite_categories {
            self.favorite_categories = categories;
        }
        if let Some(read) = patch.read_articles {
            self.read_articles = read;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
    }
}

/// Preferences mirrored to a backend
pub struct PreferencesStore<B> {
    backend: B,
    key: String,
    state: StoreState,
    prefs: Preferences,
    errors: ErrorChannel,
}

impl<B: Backend> PreferencesStore<B> {
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            state: StoreState::Uninitialized,
            prefs: Preferences::default(),
            errors: ErrorChannel::default(),
        }
    }

    pub fn open(backend: B, key: impl Into<String>) -> Self {
        let mut store = Self::new(backend, key);
        store.hydrate();
        store
    }

    /// Load stored preferences; defaults when absent or unusable
    pub fn hydrate(&mut self) {
        if self.state != StoreState::Uninitialized {
            return;
        }
        self.state = StoreState::Hydrating;
        self.prefs = blob::hydrate(&self.backend, &self.key, &mut self.errors).unwrap_or_default();
        self.state = StoreState::Ready;
        debug!("Preferences '{}' ready", self.key);
    }

    fn ensure_ready(&mut self) {
        if self.state != StoreState::Ready {
            self.hydrate();
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == StoreState::Ready
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Merge a partial update and persist
    pub fn update(&mut self, patch: PreferencesPatch) {
        self.ensure_ready();
        self.prefs.apply(patch);
        self.persist();
    }

    /// Record an article URL as read; returns false if it already was
    pub fn mark_as_read(&mut self, url: &str) -> BookmarkResult<bool> {
        let url = non_empty(url, "Article URL")?;
        self.ensure_ready();

        if self.prefs.read_articles.iter().any(|read| read == url) {
            return Ok(false);
        }
        self.prefs.read_articles.push(url.to_string());
        self.persist();
        Ok(true)
    }

    pub fn is_read(&self, url: &str) -> bool {
        let url = url.trim();
        self.prefs.read_articles.iter().any(|read| read == url)
    }

    /// Flip a category in or out of the favourites; returns the new state
    pub fn toggle_favorite_category(&mut self, category: &str) -> BookmarkResult<bool> {
        let category = non_empty(category, "Category")?;
        self.ensure_ready();

        let favorites = &mut self.prefs.favorite_categories;
        let now_favorite = match favorites.iter().position(|c| c.eq_ignore_ascii_case(category)) {
            Some(pos) => {
                favorites.remove(pos);
                false
            }
            None => {
                favorites.push(category.to_string());
                true
            }
        };
        self.persist();
        Ok(now_favorite)
    }

    pub fn is_favorite_category(&self, category: &str) -> bool {
        let category = category.trim();
        self.prefs
            .favorite_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    /// Restore defaults and delete the stored blob
    pub fn reset(&mut self) {
        self.ensure_ready();
        self.prefs = Preferences::default();
        blob::remove(&self.backend, &self.key, &mut self.errors);
    }

    pub fn last_error(&self) -> Option<&BookmarkError> {
        self.errors.last()
    }

    pub fn take_last_error(&mut self) -> Option<BookmarkError> {
        self.errors.take()
    }

    pub fn on_error(&mut self, callback: impl FnMut(&BookmarkError) + Send + 'static) {
        self.errors.set_callback(Box::new(callback));
    }

    fn persist(&mut self) {
        blob::write(&self.backend, &self.key, &self.prefs, &mut self.errors);
    }
}

fn non_empty<'a>(value: &'a str, field: &'static str) -> BookmarkResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BookmarkError::EmptyValue { field });
    }
    Ok(value)
}
