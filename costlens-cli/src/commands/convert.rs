//! Convert command - flatten saved Cost Explorer responses into a cost table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use costlens_core::{CostMetric, Dimension};
use costlens_store::{Settings, load_pages, save_json, table_from_pages};
use tracing::info;

use super::parse_dimension;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Saved `GetCostAndUsage` response files, in page order.
    #[arg(long, required = true, num_args = 1..)]
    pub pages: Vec<PathBuf>,

    /// The query's GroupBy keys (at most two), e.g. SERVICE,REGION.
    #[arg(long, value_delimiter = ',', value_parser = parse_dimension)]
    pub group_by: Vec<Dimension>,

    /// Metric to read (default from settings).
    #[arg(long, short, value_parser = parse_metric)]
    pub metric: Option<CostMetric>,

    /// Service name for queries not grouped by service.
    #[arg(long, short)]
    pub service: Option<String>,

    /// Table file to write.
    #[arg(long, short)]
    pub output: PathBuf,
}

/// Runs the convert command.
pub async fn run(args: &ConvertArgs, cli: &Cli, settings: &Settings) -> Result<()> {
    let metric = args.metric.unwrap_or(settings.cost_metric);
    info!(pages = args.pages.len(), metric = %metric, "Converting Cost Explorer pages");

    let pages = load_pages(&args.pages).await.context("Cannot read Cost Explorer pages")?;
    let table = table_from_pages(&pages, &args.group_by, metric, args.service.as_deref())?;

    save_json(&args.output, &table.to_json())
        .await
        .with_context(|| format!("Cannot write {}", args.output.display()))?;

    info!(rows = table.len(), output = %args.output.display(), "Wrote cost table");

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_conversion(&args.output, pages.len(), &table));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_conversion(&args.output, pages.len(), &table)?);
        }
    }

    Ok(())
}

fn parse_metric(s: &str) -> Result<CostMetric, String> {
    s.parse::<CostMetric>().map_err(|e| e.to_string())
}
