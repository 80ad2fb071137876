//! Command dispatch logic for highlight-export

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use highlight_export_core::config::Config;
use highlight_export_core::error::Result;

use crate::cli::{Cli, Commands, ConfigCommands};
use crate::commands;

pub fn run(cli: &Cli, start: Instant, cancel: &AtomicBool) -> Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    tracing::debug!(path = %config_path.display(), "resolved config path");

    match &cli.command {
        Commands::Sync(args) => {
            let mut config = Config::load(&config_path)?;
            config.apply_env();
            if let Some(notes_dir) = &args.notes_dir {
                config.export.notes_dir = Some(notes_dir.clone());
            }
            tracing::debug!(elapsed = ?start.elapsed(), "load_config");

            commands::sync::execute(cli, &config, args, cancel, start)
        }

        Commands::Config(ConfigCommands::Show) => {
            let mut config = Config::load(&config_path)?;
            config.apply_env();
            commands::config::show(cli, &config, &config_path)
        }

        Commands::Config(ConfigCommands::Init { force }) => {
            commands::config::init(cli, &config_path, *force)
        }
    }
}
