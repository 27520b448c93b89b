//! Data models for newsmark
//!
//! `BookmarkedItem` is what the bookmark store keeps: a caller-chosen
//! identity, an opaque payload, and the moment it was saved. `Article` is
//! the payload the news front end stores, shaped like the provider's JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An item held by a bookmark store
///
/// Only the store creates these; `saved_at` is stamped on insertion and
/// cannot be changed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkedItem<P> {
    identity: String,
    payload: P,
    saved_at: DateTime<Utc>,
}

impl<P> BookmarkedItem<P> {
    pub(crate) fn stamp(identity: String, payload: P) -> Self {
        Self {
            identity,
            payload,
            saved_at: Utc::now(),
        }
    }

    /// Unique key supplied by the caller
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Caller-defined data, passed through untouched
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// When the store inserted this item
    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    /// Consume the item, returning its payload
    pub fn into_payload(self) -> P {
        self.payload
    }
}

/// An item a caller wants to bookmark
#[derive(Debug, Clone, PartialEq)]
pub struct NewBookmark<P> {
    pub identity: String,
    pub payload: P,
}

impl<P> NewBookmark<P> {
    pub fn new(identity: impl Into<String>, payload: P) -> Self {
        Self {
            identity: identity.into(),
            payload,
        }
    }
}

/// Which branch a toggle took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Publisher of an article
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArticleSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// A news article as returned by the headline provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: ArticleSource,
    #[serde(default)]
    pub author: Option<String>,
}

impl Article {
    /// Create an article with only a URL; the title defaults to the URL
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            title: url.clone(),
            description: None,
            url,
            url_to_image: None,
            published_at: None,
            source: ArticleSource::default(),
            author: None,
        }
    }

    /// Articles are bookmarked by their canonical URL
    pub fn identity(&self) -> &str {
        &self.url
    }

    /// Wrap this article for insertion into a bookmark store
    pub fn into_bookmark(self) -> NewBookmark<Article> {
        NewBookmark::new(self.url.clone(), self)
    }
}
