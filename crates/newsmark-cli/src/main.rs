//! newsmark CLI
//!
//! Command-line interface for newsmark - save news articles for later.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use newsmark_core::{
    open_backend, BackendKind, BookmarkError, BookmarkStore, Config, PreferencesStore, Theme,
};

mod commands;
mod metadata;
mod output;
mod prompt;

use commands::bookmark::ArticleArgs;
use commands::Store;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "newsmark")]
#[command(about = "newsmark - Bookmark news articles to read later")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bookmark an article
    #[command(alias = "save")]
    Add {
        /// Article URL
        url: String,
        #[command(flatten)]
        fields: ArticleArgs,
    },
    /// Remove a bookmark
    #[command(alias = "rm")]
    Remove {
        /// Article URL
        url: String,
    },
    /// Bookmark an article, or remove it if already saved
    Toggle {
        /// Article URL
        url: String,
        #[command(flatten)]
        fields: ArticleArgs,
    },
    /// List bookmarks
    #[command(alias = "ls")]
    List,
    /// Show a bookmark
    Show {
        /// Article URL
        url: String,
    },
    /// Check whether an article is bookmarked
    Check {
        /// Article URL
        url: String,
    },
    /// Remove all bookmarks
    Clear {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show storage status
    Status,
    /// Reader preferences
    Prefs {
        #[command(subcommand)]
        command: Option<PrefsCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum PrefsCommands {
    /// Show preferences
    Show,
    /// Mark an article as read
    Read {
        /// Article URL
        url: String,
    },
    /// Add or remove a favorite category
    Favorite {
        /// Category name (e.g. technology)
        category: String,
    },
    /// Set the theme
    Theme {
        /// light or dark
        theme: Theme,
    },
    /// Set the language
    Language {
        /// Language code (e.g. en)
        code: String,
    },
    /// Restore defaults
    Reset,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, backend, storage_key, preferences_key, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands must work even when the stored config is broken
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config =
        Config::load_with_cli_override(cli.config.as_ref()).context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    if config.backend != BackendKind::Memory {
        config.ensure_data_dir()?;
    }
    let backend = open_backend(&config)
        .with_context(|| format!("Failed to open {} backend", config.backend))?;
    debug!("Using {} backend at {:?}", config.backend, config.data_dir);

    if let Commands::Prefs { command } = cli.command {
        let mut prefs = PreferencesStore::open(backend.as_ref(), config.preferences_key.clone());
        let result = handle_prefs_command(command, &mut prefs, &output);
        report_swallowed(prefs.take_last_error(), &output);
        return result;
    }

    let mut store: Store<'_> = BookmarkStore::open(backend.as_ref(), config.storage_key.clone());

    let result = match cli.command {
        Commands::Add { url, fields } => commands::bookmark::add(&mut store, url, fields, &output).await,
        Commands::Remove { url } => commands::bookmark::remove(&mut store, url, &output),
        Commands::Toggle { url, fields } => {
            commands::bookmark::toggle(&mut store, url, fields, &output).await
        }
        Commands::List => commands::bookmark::list(&store, &output),
        Commands::Show { url } => commands::bookmark::show(&store, url, &output),
        Commands::Check { url } => commands::bookmark::check(&store, url, &output),
        Commands::Clear { yes } => commands::bookmark::clear(&mut store, yes, &output),
        Commands::Status => return commands::status::show(&store, &config, &output),
        Commands::Prefs { .. } => unreachable!(),  // Handled above
        Commands::Config { .. } => unreachable!(), // Handled above
    };

    report_swallowed(store.take_last_error(), &output);
    result
}

/// Durability problems never fail a command, but the user should know
fn report_swallowed(err: Option<BookmarkError>, output: &Output) {
    if let Some(err) = err {
        for line in swallowed_warnings(&err) {
            output.warning(&line);
        }
    }
}

/// The error followed by its recovery hint, if any
fn swallowed_warnings(err: &BookmarkError) -> Vec<String> {
    let mut lines = vec![err.to_string()];
    if let Some(hint) = err.recovery_suggestion() {
        lines.push(hint.to_string());
    }
    lines
}

fn handle_prefs_command(
    command: Option<PrefsCommands>,
    store: &mut PreferencesStore<&dyn newsmark_core::Backend>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(PrefsCommands::Show) | None => commands::prefs::show(store, output),
        Some(PrefsCommands::Read { url }) => commands::prefs::read(store, url, output),
        Some(PrefsCommands::Favorite { category }) => {
            commands::prefs::favorite(store, category, output)
        }
        Some(PrefsCommands::Theme { theme }) => commands::prefs::theme(store, theme, output),
        Some(PrefsCommands::Language { code }) => commands::prefs::language(store, code, output),
        Some(PrefsCommands::Reset) => commands::prefs::reset(store, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging to stderr, or to the configured log file
///
/// `RUST_LOG` overrides the default filter.
fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { "error" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("newsmark_core={},newsmark_cli={}", level, level))
    });

    if let Some(ref log_path) = config.log_file {
        match OpenOptions::new().create(true).append(true).open(log_path) {
            Ok(file) => {
                // Ignore error if already initialized
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
                return;
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsmark_core::{Backend, MemoryBackend, Preferences};

    #[test]
    fn test_prefs_warning_includes_hint() {
        let backend = MemoryBackend::new();
        backend.set("newsmark_preferences", "{theme: dark").unwrap();

        let mut prefs = PreferencesStore::open(&backend, "newsmark_preferences");
        assert_eq!(prefs.preferences(), &Preferences::default());

        let err = prefs.take_last_error().unwrap();
        let lines = swallowed_warnings(&err);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("newsmark_preferences"));
        assert_eq!(lines[1], "The stored data was unreadable and has been reset.");
    }

    #[test]
    fn test_invariant_errors_have_no_hint() {
        let lines = swallowed_warnings(&BookmarkError::MissingIdentity);
        assert_eq!(lines.len(), 1);
    }
}
