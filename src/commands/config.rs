//! `highlight-export config` commands

use std::path::Path;

use highlight_export_core::config::Config;
use highlight_export_core::error::{ExportError, Result};

use crate::cli::{Cli, OutputFormat};

/// Print the effective configuration with the token masked
pub fn show(cli: &Cli, config: &Config, path: &Path) -> Result<()> {
    let config = config.redacted();

    match cli.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": path.display().to_string(),
                "exists": path.exists(),
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            let toml = toml::to_string_pretty(&config)
                .map_err(|e| ExportError::Other(format!("failed to serialize config: {}", e)))?;
            if !cli.quiet {
                let origin = if path.exists() { "" } else { " (not found, defaults)" };
                println!("# {}{}", path.display(), origin);
            }
            print!("{}", toml);
        }
    }

    Ok(())
}

/// Write a default configuration file
pub fn init(cli: &Cli, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ExportError::UsageError(format!(
            "config file already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    Config::default().save(path)?;
    tracing::info!(path = %path.display(), "wrote default config");

    match cli.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "status": "ok",
                "path": path.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            if !cli.quiet {
                println!("Wrote default config to {}", path.display());
            }
        }
    }

    Ok(())
}
