// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! costlens CLI - AWS cost categorization from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Categorize every built-in service from the data directory
//! costlens
//!
//! # One service, per billing period, last three months
//! costlens categorize --service s3 --by-period --months 3
//!
//! # Top five regions per period
//! costlens report --by region --top 5
//!
//! # Flatten saved Cost Explorer responses into a table
//! costlens convert --pages page1.json page2.json --group-by SERVICE,REGION --output costs.json
//!
//! # JSON output
//! costlens --format json --pretty services
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use costlens_store::{LogLevel, SettingsStore};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{categorize, config, convert, report, services};

// ============================================================================
// CLI Definition
// ============================================================================

/// costlens CLI - AWS cost categorization.
#[derive(Parser)]
#[command(name = "costlens")]
#[command(about = "AWS Cost Explorer usage categorization and cost reports")]
#[command(long_about = r#"
costlens sorts AWS usage costs into per-service categories and prints
pivoted cost reports.

Built-in services:
  • Amazon Simple Storage Service (s3)
  • Amazon Elastic Compute Cloud (ec2)
  • EC2 - Other (ec2-other)
  • Amazon Elastic File System (efs)
  • Amazon Relational Database Service (rds)

Examples:
  costlens                           # Categorize all services
  costlens categorize --service s3   # Single service
  costlens report --by region        # Cost by region per period
  costlens --format json services    # JSON output
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'categorize' for every service.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Directory holding the exported cost tables.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Categorize usage costs per service (default if no command specified).
    #[command(visible_alias = "cat")]
    Categorize(categorize::CategorizeArgs),

    /// Show a pivoted cost report.
    #[command(visible_alias = "r")]
    Report(report::ReportArgs),

    /// List built-in services.
    #[command(visible_alias = "s")]
    Services,

    /// Convert saved Cost Explorer responses into a cost table.
    Convert(convert::ConvertArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("costlens=debug,info")
    } else {
        EnvFilter::new(format!("costlens={level}"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = run(&cli).await;

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    std::process::exit(ExitCode::Success as i32);
}

async fn run(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let settings = store.get().await;

    setup_logging(cli.verbose, cli.quiet, settings.log_level);
    if let Some(error) = store.load_error() {
        warn!(path = %store.path().display(), %error, "Ignored unreadable settings file, using defaults");
    }

    match &cli.command {
        Some(Commands::Categorize(args)) => categorize::run(args, cli, &settings).await,
        Some(Commands::Report(args)) => report::run(args, cli, &settings).await,
        Some(Commands::Services) => services::run(cli),
        Some(Commands::Convert(args)) => convert::run(args, cli, &settings).await,
        Some(Commands::Config(args)) => config::run(args, cli, &store).await,
        None => categorize::run(&categorize::CategorizeArgs::default(), cli, &settings).await,
    }
}
