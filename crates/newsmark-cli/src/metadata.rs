//! Article metadata fetching
//!
//! Fills in title, summary, image, source and author when an article is
//! bookmarked by URL alone.

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use tracing::debug;

/// Metadata extracted from an article page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub site_name: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// Fetch metadata from a URL
///
/// Returns empty metadata on failure (graceful degradation).
pub async fn fetch_metadata(url: &str) -> ArticleMetadata {
    match fetch_metadata_inner(url).await {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!("Metadata fetch for {} failed: {}", url, e);
            ArticleMetadata::default()
        }
    }
}

async fn fetch_metadata_inner(url: &str) -> Result<ArticleMetadata> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT))
        .user_agent(concat!("Mozilla/5.0 (compatible; newsmark/", env!("CARGO_PKG_VERSION"), ")"))
        .build()?;

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        debug!("Metadata fetch for {} returned {}", url, response.status());
        return Ok(ArticleMetadata::default());
    }

    let html = response.text().await?;
    Ok(parse_metadata(&html))
}

/// Parse metadata from HTML content
pub fn parse_metadata(html: &str) -> ArticleMetadata {
    let document = Html::parse_document(html);

    ArticleMetadata {
        title: extract_title(&document),
        description: extract_description(&document),
        image: extract_meta_content(&document, "og:image")
            .or_else(|| extract_meta_content(&document, "twitter:image")),
        site_name: extract_meta_content(&document, "og:site_name"),
        author: extract_meta_content(&document, "article:author")
            .or_else(|| extract_meta_content(&document, "author")),
        published_at: extract_meta_content(&document, "article:published_time")
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Extract title from HTML
fn extract_title(document: &Html) -> Option<String> {
    if let Some(og_title) = extract_meta_content(document, "og:title") {
        return Some(og_title);
    }

    if let Some(twitter_title) = extract_meta_content(document, "twitter:title") {
        return Some(twitter_title);
    }

    // Fall back to <title> tag
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract description from HTML
fn extract_description(document: &Html) -> Option<String> {
    extract_meta_content(document, "og:description")
        .or_else(|| extract_meta_content(document, "twitter:description"))
        .or_else(|| extract_meta_content(document, "description"))
}

/// Extract content from a meta tag by property or name
fn extract_meta_content(document: &Html, property: &str) -> Option<String> {
    for attr in ["property", "name"] {
        let Ok(selector) = Selector::parse(&format!(r#"meta[{}="{}"]"#, attr, property)) else {
            continue;
        };
        let content = document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty());
        if let Some(content) = content {
            return Some(content.to_string());
        }
    }
    None
}
