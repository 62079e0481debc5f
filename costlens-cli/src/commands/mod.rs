//! CLI command implementations.

pub mod categorize;
pub mod config;
pub mod convert;
pub mod report;
pub mod services;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use costlens_core::{CostTable, DateRange, Dimension};
use costlens_store::{FileDataSource, Settings, load_table};
use tracing::debug;

use crate::Cli;

/// Returns the data directory: `--data-dir`, then settings, then the
/// platform default.
pub fn data_dir(cli: &Cli, settings: &Settings) -> PathBuf {
    cli.data_dir.clone().unwrap_or_else(|| settings.data_dir())
}

/// Loads the data directory.
pub async fn load_source(cli: &Cli, settings: &Settings) -> Result<FileDataSource> {
    let dir = data_dir(cli, settings);
    FileDataSource::load(&dir)
        .await
        .with_context(|| format!("Cannot load cost tables from {}", dir.display()))
}

/// Loads a table given with `--input`.
pub async fn load_input(path: &Path) -> Result<CostTable> {
    load_table(path)
        .await
        .with_context(|| format!("Cannot load cost table {}", path.display()))
}

/// Builds the date range selected by `--days` or `--months`, if any.
pub fn date_range(days: Option<u32>, months: Option<u32>) -> Result<Option<DateRange>> {
    let range = match (days, months) {
        (Some(days), _) => Some(DateRange::last_days(days)?),
        (None, Some(months)) => Some(DateRange::last_months(months)?),
        (None, None) => None,
    };
    if let Some(range) = &range {
        debug!(range = %range, "Limiting rows to date range");
    }
    Ok(range)
}

/// Keeps the rows billed inside `range`.
pub fn restrict(table: CostTable, range: Option<&DateRange>) -> CostTable {
    match range {
        Some(range) => table.within(range),
        None => table,
    }
}

/// Parses a dimension argument: `service`, `region`, `usage-type` or
/// `tag:KEY`.
pub fn parse_dimension(s: &str) -> Result<Dimension, String> {
    s.parse::<Dimension>().map_err(|e| e.to_string())
}
