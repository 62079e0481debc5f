//! Report command - pivoted cost report by service, region, usage type or tag.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use costlens_core::{CostTable, Dimension, Selector, cost_report, filter_preserve_dates, summarize_by};
use costlens_store::Settings;
use tracing::info;

use super::{load_input, load_source, parse_dimension};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Cost table to read instead of the data directory's costs.json.
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Row dimension: service, region, usage-type or tag:KEY.
    #[arg(long, short, default_value = "service", value_parser = parse_dimension)]
    pub by: Dimension,

    /// Keep the top N rows of every period (default from settings).
    #[arg(long, short, conflicts_with_all = ["select", "all"])]
    pub top: Option<usize>,

    /// Keep only these rows (comma-separated).
    #[arg(long, value_delimiter = ',', conflicts_with = "all")]
    pub select: Vec<String>,

    /// Keep every row.
    #[arg(long)]
    pub all: bool,

    /// Only rows where DIMENSION=VALUE; periods with no match still show.
    #[arg(long, value_parser = parse_filter)]
    pub filter: Vec<(Dimension, String)>,

    /// Print total cost per row value instead of the period pivot.
    #[arg(long)]
    pub summary: bool,
}

/// Runs the report command.
pub async fn run(args: &ReportArgs, cli: &Cli, settings: &Settings) -> Result<()> {
    let table = match &args.input {
        Some(path) => load_input(path).await?,
        None => {
            let source = load_source(cli, settings).await?;
            source.service_costs()?.clone()
        }
    };
    let table = apply_filters(table, &args.filter)?;

    info!(by = %args.by, rows = table.len(), summary = args.summary, "Building cost report");

    if args.summary {
        let rows = summarize_by(&table, std::slice::from_ref(&args.by), Some(settings.report_threshold));
        match cli.format {
            OutputFormat::Text => {
                let formatter = TextFormatter::new(!cli.no_color);
                println!("{}", formatter.format_summary(&args.by, &rows));
            }
            OutputFormat::Json => {
                let formatter = JsonFormatter::new(cli.pretty);
                println!("{}", formatter.format_summary(&args.by, &rows)?);
            }
        }
        return Ok(());
    }

    let report = cost_report(&table, &args.by, &selector(args, settings))?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_report(&report));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_report(&report)?);
        }
    }

    Ok(())
}

fn selector(args: &ReportArgs, settings: &Settings) -> Selector {
    if args.all {
        Selector::All
    } else if !args.select.is_empty() {
        Selector::Named(args.select.clone())
    } else {
        Selector::Top(args.top.unwrap_or(settings.top_n))
    }
}

fn apply_filters(table: CostTable, filters: &[(Dimension, String)]) -> Result<CostTable> {
    if filters.is_empty() {
        return Ok(table);
    }
    Ok(filter_preserve_dates(&table, filters)?)
}

fn parse_filter(s: &str) -> Result<(Dimension, String), String> {
    let (dim, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected DIMENSION=VALUE, got {s:?}"))?;
    Ok((parse_dimension(dim)?, value.trim().to_string()))
}
