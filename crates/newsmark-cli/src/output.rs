//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use newsmark_core::{Article, BookmarkedItem, Preferences};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single bookmark
    pub fn print_bookmark(&self, item: &BookmarkedItem<Article>) {
        let article = item.payload();
        match self.format {
            OutputFormat::Human => {
                println!("Title:       {}", article.title);
                println!("URL:         {}", article.url);
                if !article.source.name.is_empty() {
                    println!("Source:      {}", article.source.name);
                }
                if let Some(ref author) = article.author {
                    println!("Author:      {}", author);
                }
                if let Some(published) = article.published_at {
                    println!("Published:   {}", published.format("%Y-%m-%d %H:%M"));
                }
                if let Some(ref image) = article.url_to_image {
                    println!("Image:       {}", image);
                }
                if let Some(ref desc) = article.description {
                    println!("Description: {}", desc);
                }
                println!("Saved:       {}", item.saved_at().format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(item),
            OutputFormat::Quiet => println!("{}", item.identity()),
        }
    }

    /// Print a list of bookmarks
    pub fn print_bookmarks(&self, items: &[BookmarkedItem<Article>]) {
        match self.format {
            OutputFormat::Human => {
                if items.is_empty() {
                    println!("No saved articles yet.");
                    return;
                }
                for item in items {
                    let article = item.payload();
                    let source = if article.source.name.is_empty() {
                        String::new()
                    } else {
                        format!(" ({})", truncate(&article.source.name, 20))
                    };
                    println!(
                        "{}  {}{}",
                        item.saved_at().format("%Y-%m-%d"),
                        truncate_line(&article.title, 60),
                        source
                    );
                    println!("            {}", article.url);
                }
                println!("\n{}", saved_count(items.len()));
            }
            OutputFormat::Json => print_json(&items),
            OutputFormat::Quiet => {
                for item in items {
                    println!("{}", item.identity());
                }
            }
        }
    }

    /// Print whether a URL is bookmarked
    pub fn print_check(&self, url: &str, saved: bool) {
        match self.format {
            OutputFormat::Human => {
                if saved {
                    println!("✓ Bookmarked: {}", url);
                } else {
                    println!("Not bookmarked: {}", url);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"url": url, "saved": saved}));
            }
            OutputFormat::Quiet => println!("{}", saved),
        }
    }

    /// Print reader preferences
    pub fn print_preferences(&self, prefs: &Preferences) {
        match self.format {
            OutputFormat::Human => {
                println!("Theme:      {}", prefs.theme);
                println!("Language:   {}", prefs.language);
                println!(
                    "Favorites:  {}",
                    if prefs.favorite_categories.is_empty() {
                        "(none)".to_string()
                    } else {
                        prefs.favorite_categories.join(", ")
                    }
                );
                println!("Read:       {} article(s)", prefs.read_articles.len());
            }
            OutputFormat::Json => print_json(prefs),
            OutputFormat::Quiet => println!("{}", prefs.theme),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a non-fatal problem to stderr
    pub fn warning(&self, message: &str) {
        match self.format {
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({"warning": message}));
            }
            _ => eprintln!("Warning: {}", message),
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to render JSON: {}", e),
    }
}

/// "1 saved article" / "3 saved articles"
fn saved_count(count: usize) -> String {
    format!(
        "{} saved {}",
        count,
        if count == 1 { "article" } else { "articles" }
    )
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
