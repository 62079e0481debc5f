//! JSON output formatting.

use std::path::Path;

use anyhow::Result;
use costlens_core::{CostReport, CostTable, Dimension, PeriodRollup, PivotRow, Rollup, SummaryRow};
use costlens_services::ServicePlugin;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Breakdown, Categorized};

// ============================================================================
// Output Types
// ============================================================================

/// Service info output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfoOutput {
    pub name: String,
    pub abbreviation: String,
    pub shortname: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub categories: Vec<String>,
}

/// One rollup row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupRowOutput {
    pub category: String,
    pub subtype: String,
    pub cost: Decimal,
}

/// A rollup limited to one billing period.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodOutput {
    pub start: String,
    pub end: String,
    pub total: Decimal,
    pub rows: Vec<RollupRowOutput>,
}

/// Categorization of one service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeOutput {
    pub service: String,
    pub shortname: String,
    pub abbreviation: String,
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<RollupRowOutput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periods: Option<Vec<PeriodOutput>>,
    pub unclassified: bool,
}

/// One labelled report row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRowOutput {
    pub label: String,
    pub values: Vec<Decimal>,
    pub total: Decimal,
}

/// Pivoted cost report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput {
    pub dimension: String,
    pub columns: Vec<String>,
    pub rows: Vec<ReportRowOutput>,
    pub total: ReportRowOutput,
}

/// Cost of one dimension value.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryItemOutput {
    pub value: String,
    pub cost: Decimal,
}

/// Total cost per dimension value.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOutput {
    pub dimension: String,
    pub rows: Vec<SummaryItemOutput>,
    pub total: Decimal,
}

/// Result of a page conversion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOutput {
    pub output: String,
    pub pages: usize,
    pub rows: usize,
    pub periods: usize,
    pub total: Decimal,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats the service list.
    pub fn format_services(&self, plugins: &[&dyn ServicePlugin]) -> Result<String> {
        let outputs: Vec<ServiceInfoOutput> = plugins
            .iter()
            .map(|plugin| {
                let mut categories: Vec<String> = Vec::new();
                for rule in plugin.rules() {
                    if !categories.contains(&rule.category) {
                        categories.push(rule.category.clone());
                    }
                }
                ServiceInfoOutput {
                    name: plugin.name().to_string(),
                    abbreviation: plugin.abbreviation().to_string(),
                    shortname: plugin.shortname().to_string(),
                    aliases: plugin.metadata().aliases.clone(),
                    categories,
                }
            })
            .collect();

        self.format(&outputs)
    }

    /// Formats categorization results.
    ///
    /// A single service is written as an object, several as an array.
    pub fn format_categorized(&self, results: &[Categorized]) -> Result<String> {
        let outputs: Vec<CategorizeOutput> = results.iter().map(categorized_to_output).collect();

        if outputs.len() == 1 {
            self.format(&outputs[0])
        } else {
            self.format(&outputs)
        }
    }

    /// Formats a pivoted cost report.
    pub fn format_report(&self, report: &CostReport) -> Result<String> {
        let output = ReportOutput {
            dimension: report.dimension.clone(),
            columns: report
                .columns
                .iter()
                .map(|c| c.format("%Y-%m-%d").to_string())
                .collect(),
            rows: report.rows.iter().map(pivot_row_to_output).collect(),
            total: pivot_row_to_output(&report.total),
        };
        self.format(&output)
    }

    /// Formats total cost per dimension value.
    pub fn format_summary(&self, dimension: &Dimension, rows: &[SummaryRow]) -> Result<String> {
        let output = SummaryOutput {
            dimension: dimension.to_string(),
            rows: rows
                .iter()
                .map(|r| SummaryItemOutput {
                    value: r.keys.join(" / "),
                    cost: r.cost,
                })
                .collect(),
            total: rows.iter().map(|r| r.cost).sum(),
        };
        self.format(&output)
    }

    /// Formats the result of converting Cost Explorer pages.
    pub fn format_conversion(&self, output: &Path, pages: usize, table: &CostTable) -> Result<String> {
        self.format(&ConvertOutput {
            output: output.display().to_string(),
            pages,
            rows: table.len(),
            periods: table.periods().len(),
            total: table.total_cost(),
        })
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn categorized_to_output(result: &Categorized) -> CategorizeOutput {
    let (total, rows, periods): (Decimal, Option<Vec<RollupRowOutput>>, Option<Vec<PeriodOutput>>) =
        match &result.breakdown {
            Breakdown::Whole(rollup) => (rollup.total(), Some(rollup_rows(rollup)), None),
            Breakdown::ByPeriod(periods) => (
                periods.iter().map(|p| p.rollup.total()).sum(),
                None,
                Some(periods.iter().map(period_to_output).collect()),
            ),
        };

    CategorizeOutput {
        service: result.name.clone(),
        shortname: result.shortname.clone(),
        abbreviation: result.abbreviation.clone(),
        total,
        rows,
        periods,
        unclassified: result.breakdown.has_unclassified(),
    }
}

fn rollup_rows(rollup: &Rollup) -> Vec<RollupRowOutput> {
    rollup
        .rows()
        .iter()
        .map(|row| RollupRowOutput {
            category: row.category.clone(),
            subtype: row.subtype.clone(),
            cost: row.cost,
        })
        .collect()
}

fn period_to_output(period: &PeriodRollup) -> PeriodOutput {
    PeriodOutput {
        start: period.start.format("%Y-%m-%d").to_string(),
        end: period.end.format("%Y-%m-%d").to_string(),
        total: period.rollup.total(),
        rows: rollup_rows(&period.rollup),
    }
}

fn pivot_row_to_output(row: &PivotRow) -> ReportRowOutput {
    ReportRowOutput {
        label: row.label.clone(),
        values: row.values.clone(),
        total: row.total(),
    }
}

// ============================================================================
// Tests
// ============================================================================
