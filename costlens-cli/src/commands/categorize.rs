//! Categorize command - roll usage costs up into service categories.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use costlens_core::{CostTable, DateRange};
use costlens_services::{ServicePlugin, ServiceRegistry};
use costlens_store::{FileDataSource, Settings};
use tracing::{debug, info, warn};

use super::{date_range, load_input, load_source, restrict};
use crate::output::{Breakdown, Categorized, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the categorize command.
#[derive(Args, Default)]
pub struct CategorizeArgs {
    /// Service to categorize: slug, abbreviation, full name or "all".
    #[arg(long, short)]
    pub service: Option<String>,

    /// Usage table to read instead of the data directory.
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// One rollup per billing period.
    #[arg(long)]
    pub by_period: bool,

    /// Only rows from the last N days.
    #[arg(long, conflicts_with = "months")]
    pub days: Option<u32>,

    /// Only rows from the last N months (1-12).
    #[arg(long)]
    pub months: Option<u32>,
}

/// Where usage rows come from.
enum Input {
    /// One table shared by every service.
    Table(CostTable),
    /// Per-service tables in the data directory.
    Directory(FileDataSource),
}

impl Input {
    fn table_for(&self, plugin: &dyn ServicePlugin) -> CostTable {
        match self {
            Input::Table(table) => table.clone(),
            Input::Directory(source) => source.usage_costs(plugin),
        }
    }
}

/// Runs the categorize command.
pub async fn run(args: &CategorizeArgs, cli: &Cli, settings: &Settings) -> Result<()> {
    let registry = ServiceRegistry::with_builtin();
    let plugins = select_services(&registry, args.service.as_deref())?;
    let range = date_range(args.days, args.months)?;

    info!(services = plugins.len(), by_period = args.by_period, "Categorizing usage");

    let input = match &args.input {
        Some(path) => Input::Table(load_input(path).await?),
        None => Input::Directory(load_source(cli, settings).await?),
    };

    let results: Vec<Categorized> = plugins
        .into_iter()
        .map(|plugin| categorize(plugin, &input, range.as_ref(), args.by_period))
        .collect();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let blocks: Vec<String> = results.iter().map(|r| formatter.format_categorized(r)).collect();
            println!("{}", blocks.join("\n\n"));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_categorized(&results)?);
        }
    }

    Ok(())
}

/// Resolves `--service` to plugins. No value or "all" selects every one.
fn select_services<'a>(registry: &'a ServiceRegistry, query: Option<&str>) -> Result<Vec<&'a dyn ServicePlugin>> {
    match query.map(str::trim) {
        None | Some("all") => Ok(registry.all().collect()),
        Some(query) => Ok(vec![registry.find(query)?]),
    }
}

fn categorize(plugin: &dyn ServicePlugin, input: &Input, range: Option<&DateRange>, by_period: bool) -> Categorized {
    let table = restrict(input.table_for(plugin), range);
    debug!(service = plugin.shortname(), rows = table.len(), "Categorizing service");

    let breakdown = if by_period {
        Breakdown::ByPeriod(plugin.categorize_usage_by_period(&table))
    } else {
        Breakdown::Whole(plugin.categorize_usage(&table))
    };

    if breakdown.has_unclassified() {
        warn!(service = plugin.shortname(), "Rollup needed a reconciliation row");
    }

    Categorized {
        name: plugin.name().to_string(),
        shortname: plugin.shortname().to_string(),
        abbreviation: plugin.abbreviation().to_string(),
        breakdown,
    }
}
