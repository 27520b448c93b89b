//! Status command handler

use anyhow::Result;

use newsmark_core::Config;

use super::Store;
use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store<'_>, config: &Config, output: &Output) -> Result<()> {
    let last_error = store.last_error().map(|e| e.to_string());
    let blob_path = config.blob_path(store.key());

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "backend": config.backend.to_string(),
                    "data_dir": config.data_dir,
                    "storage_key": store.key(),
                    "blob_path": blob_path,
                    "ready": store.is_ready(),
                    "count": store.count(),
                    "last_error": last_error,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.count());
        }
        OutputFormat::Human => {
            println!("newsmark status");
            println!("===============");
            println!();
            println!("Storage:");
            println!("  Backend:  {}", config.backend);
            println!("  Location: {}", config.data_dir.display());
            println!("  Key:      {}", store.key());
            match blob_path {
                Some(path) => println!("  Blob:     {}", path.display()),
                None => println!("  Blob:     (in memory)"),
            }
            println!(
                "  State:    {}",
                if store.is_ready() { "ready" } else { "loading" }
            );
            println!();
            println!("Contents:");
            println!("  Bookmarks: {}", store.count());
            if let Some(err) = last_error {
                println!();
                println!("Last error:");
                println!("  {}", err);
                if let Some(hint) = store.last_error().and_then(|e| e.recovery_suggestion()) {
                    println!("  {}", hint);
                }
            }
        }
    }

    Ok(())
}
