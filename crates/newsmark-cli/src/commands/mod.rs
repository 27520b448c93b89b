//! Command handlers

pub mod bookmark;
pub mod config;
pub mod prefs;
pub mod status;

use newsmark_core::{Backend, NewsStore};

/// Bookmark store over whichever backend the config selected
pub type Store<'a> = NewsStore<&'a dyn Backend>;
