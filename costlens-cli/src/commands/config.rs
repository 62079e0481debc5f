//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use costlens_store::{SettingsStore, default_config_dir, ensure_dir};
use tracing::info;

use super::data_dir;
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Write a default settings file and create the data directory.
    Init {
        /// Overwrite an existing settings file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, store).await,
        ConfigAction::Path => show_paths(cli, store).await,
        ConfigAction::Init { force } => init_config(cli, store, *force).await,
    }
}

async fn show_config(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            println!("costlens Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Data dir:         {}", data_dir(cli, &settings).display());
            println!("Cost metric:      {}", settings.cost_metric);
            println!("Granularity:      {}", settings.granularity);
            println!("Report threshold: {}", settings.report_threshold);
            println!("Top N:            {}", settings.top_n);
            println!("Log level:        {}", settings.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

async fn show_paths(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let config_dir = default_config_dir();
    let settings = store.get().await;
    let data_dir = data_dir(cli, &settings);

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", store.path().display());
            println!("Data dir:      {}", data_dir.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "configDir": config_dir.display().to_string(),
                "settingsFile": store.path().display().to_string(),
                "dataDir": data_dir.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn init_config(cli: &Cli, store: &SettingsStore, force: bool) -> Result<()> {
    let path = store.path();

    if tokio::fs::try_exists(path).await? && !force {
        println!("Settings file already exists: {}", path.display());
        println!("Use --force to overwrite it with the current values.");
    } else {
        store.save().await?;
        info!(path = %path.display(), "Settings written");
        println!("Wrote settings: {}", path.display());
    }

    let settings = store.get().await;
    let data_dir = data_dir(cli, &settings);
    ensure_dir(&data_dir).await?;
    println!("Data dir:       {}", data_dir.display());

    Ok(())
}
