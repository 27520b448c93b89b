//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use newsmark_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "backend": config.backend.to_string(),
                    "storage_key": config.storage_key,
                    "preferences_key": config.preferences_key,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:        {}", config.data_dir.display());
            println!("  backend:         {}", config.backend);
            println!("  storage_key:     {}", config.storage_key);
            println!("  preferences_key: {}", config.preferences_key);
            println!(
                "  log_file:        {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply_setting(&mut config, &key, &value)?;
    config.validate()?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "backend" => {
            config.backend = value.parse()?;
        }
        "storage_key" => {
            config.storage_key = value.to_string();
        }
        "preferences_key" => {
            config.preferences_key = value.to_string();
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, backend, storage_key, preferences_key, log_file",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsmark_core::BackendKind;

    #[test]
    fn test_apply_setting() {
        let mut config = Config::default();

        apply_setting(&mut config, "backend", "sqlite").unwrap();
        assert_eq!(config.backend, BackendKind::Sqlite);

        apply_setting(&mut config, "log_file", "/tmp/newsmark.log").unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/newsmark.log")));
        apply_setting(&mut config, "log_file", "none").unwrap();
        assert!(config.log_file.is_none());

        apply_setting(&mut config, "storage_key", "saved").unwrap();
        assert_eq!(config.storage_key, "saved");
    }

    #[test]
    fn test_apply_setting_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply_setting(&mut config, "backend", "tape").is_err());
        assert!(apply_setting(&mut config, "sync_url", "x").is_err());

        apply_setting(&mut config, "storage_key", "   ").unwrap();
        assert!(config.validate().is_err());
    }
}
