//! Bookmark command handlers

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use newsmark_core::{Article, Toggled};

use super::Store;
use crate::metadata::{fetch_metadata, ArticleMetadata};
use crate::output::Output;
use crate::prompt::confirm;

/// Article fields that can be given on the command line
#[derive(Args, Debug, Clone, Default)]
pub struct ArticleArgs {
    /// Headline
    #[arg(long)]
    pub title: Option<String>,
    /// Summary
    #[arg(long)]
    pub description: Option<String>,
    /// Image URL
    #[arg(long)]
    pub image: Option<String>,
    /// Publisher name
    #[arg(long)]
    pub source: Option<String>,
    /// Author
    #[arg(long)]
    pub author: Option<String>,
    /// Publication time (RFC 3339)
    #[arg(long)]
    pub published: Option<DateTime<Utc>>,
    /// Don't fetch missing fields from the page
    #[arg(long)]
    pub no_fetch: bool,
}

impl ArticleArgs {
    /// Whether every field the page could supply was given explicitly
    fn is_complete(&self) -> bool {
        self.title.is_some()
            && self.description.is_some()
            && self.image.is_some()
            && self.source.is_some()
            && self.author.is_some()
            && self.published.is_some()
    }
}

/// Bookmark an article
pub async fn add(store: &mut Store<'_>, url: String, fields: ArticleArgs, output: &Output) -> Result<()> {
    let already_saved = store.is_saved(&url);
    let article = build_article(url, fields).await;

    let item = store.add(article.into_bookmark())?;

    output.success(&format!("Saved: {}", item.payload().title));
    output.print_bookmark(item);
    if already_saved {
        output.warning("this URL was already bookmarked; it is now listed twice");
    }
    Ok(())
}

/// Remove every bookmark for a URL
pub fn remove(store: &mut Store<'_>, url: String, output: &Output) -> Result<()> {
    match store.remove(&url) {
        0 => output.message(&format!("Not bookmarked: {}", url)),
        1 => output.success(&format!("Removed: {}", url)),
        n => output.success(&format!("Removed {} entries for: {}", n, url)),
    }
    Ok(())
}

/// Bookmark a URL if it isn't saved, remove it otherwise
pub async fn toggle(
    store: &mut Store<'_>,
    url: String,
    fields: ArticleArgs,
    output: &Output,
) -> Result<()> {
    // Only fetch when the toggle will add
    let article = if store.is_saved(&url) {
        Article::new(url.clone())
    } else {
        build_article(url.clone(), fields).await
    };

    match store.toggle(article.into_bookmark())? {
        Toggled::Added => output.success(&format!("Saved: {}", url)),
        Toggled::Removed => output.success(&format!("Removed: {}", url)),
    }
    Ok(())
}

/// List all bookmarks in the order they were saved
pub fn list(store: &Store<'_>, output: &Output) -> Result<()> {
    output.print_bookmarks(store.all());
    Ok(())
}

/// Show a single bookmark
pub fn show(store: &Store<'_>, url: String, output: &Output) -> Result<()> {
    let item = store
        .get(&url)
        .ok_or_else(|| anyhow!("Not bookmarked: {}", url))?;
    output.print_bookmark(item);
    Ok(())
}

/// Report whether a URL is bookmarked
pub fn check(store: &Store<'_>, url: String, output: &Output) -> Result<()> {
    output.print_check(&url, store.is_saved(&url));
    Ok(())
}

/// Remove all bookmarks
pub fn clear(store: &mut Store<'_>, yes: bool, output: &Output) -> Result<()> {
    let count = store.count();
    if count == 0 {
        output.message("No bookmarks to clear.");
        return Ok(());
    }

    if !yes && output.should_prompt() {
        let noun = if count == 1 { "bookmark" } else { "bookmarks" };
        if !confirm(&format!("Remove all {} {}?", count, noun))? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.clear();
    output.success(&format!("Cleared {} bookmark(s)", count));
    Ok(())
}

/// Build an article from explicit fields, fetching the rest from the page
async fn build_article(url: String, fields: ArticleArgs) -> Article {
    let metadata = if fields.no_fetch || fields.is_complete() {
        ArticleMetadata::default()
    } else {
        fetch_metadata(&url).await
    };
    assemble_article(url, metadata, fields)
}

/// Explicit fields win over fetched metadata
fn assemble_article(url: String, metadata: ArticleMetadata, fields: ArticleArgs) -> Article {
    let mut article = Article::new(url);

    if let Some(title) = fields.title.or(metadata.title) {
        article.title = title;
    }
    article.description = fields.description.or(metadata.description);
    article.url_to_image = fields.image.or(metadata.image);
    article.author = fields.author.or(metadata.author);
    article.published_at = fields.published.or(metadata.published_at);
    if let Some(source) = fields.source.or(metadata.site_name) {
        article.source.name = source;
    }

    article
}
