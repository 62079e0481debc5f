//! Pivoted cost reports.
//!
//! These transforms turn a [`CostTable`] into the tabular views the CLI
//! prints: group-by summaries, a dimension-by-period pivot, and a top-N
//! report with an `Other` remainder row and a separate `Total` row.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::error::CoreError;
use crate::models::{CostTable, LineItem};

/// Label of the remainder row of a [`CostReport`].
pub const OTHER_ROW: &str = "Other";

/// Label of the total row of a [`CostReport`].
pub const TOTAL_ROW: &str = "Total";

// ============================================================================
// Dimension
// ============================================================================

/// A column a report can group rows by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Service name.
    Service,
    /// Usage type.
    UsageType,
    /// Region code. Rows without a region group under `""`.
    Region,
    /// A tag column. Rows without the tag group under `""`.
    Tag(String),
}

impl Dimension {
    /// Returns the column name used as the row label header.
    pub fn label(&self) -> &str {
        match self {
            Self::Service => "Service",
            Self::UsageType => "Usage_type",
            Self::Region => "Region",
            Self::Tag(key) => key,
        }
    }

    /// Returns this dimension's value for a line item.
    pub fn value_of(&self, item: &LineItem) -> String {
        match self {
            Self::Service => item.service.clone(),
            Self::UsageType => item.usage_type.clone(),
            Self::Region => item.region.clone().unwrap_or_default(),
            Self::Tag(key) => item.tag(key).unwrap_or_default().to_string(),
        }
    }

    fn matches(&self, item: &LineItem, value: &str) -> bool {
        match self {
            Self::Service => item.service == value,
            Self::UsageType => item.usage_type == value,
            Self::Region => item.region.as_deref().unwrap_or_default() == value,
            Self::Tag(key) => item.tag(key).unwrap_or_default() == value,
        }
    }

    fn assign(&self, item: &mut LineItem, value: &str) {
        match self {
            Self::Service => item.service = value.to_string(),
            Self::UsageType => item.usage_type = value.to_string(),
            Self::Region => item.region = Some(value.to_string()),
            Self::Tag(key) => {
                item.tags.insert(key.clone(), value.to_string());
            }
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(key) => write!(f, "tag:{key}"),
            other => f.write_str(other.label()),
        }
    }
}

impl FromStr for Dimension {
    type Err = CoreError;

    /// Parses `service`, `usage-type`, `region` or `tag:KEY`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(key) = s.strip_prefix("tag:") {
            if key.is_empty() {
                return Err(CoreError::InvalidData("tag dimension needs a key".to_string()));
            }
            return Ok(Self::Tag(key.to_string()));
        }

        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "service" => Ok(Self::Service),
            "usagetype" | "usage" => Ok(Self::UsageType),
            "region" => Ok(Self::Region),
            _ => Err(CoreError::InvalidData(format!("Unknown dimension: {s}"))),
        }
    }
}

// ============================================================================
// Summaries
// ============================================================================

/// One group of a [`summarize_by`] result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    /// Group key, one value per requested dimension.
    pub keys: Vec<String>,
    /// Summed cost of the group.
    pub cost: Decimal,
}

/// Sums cost per distinct combination of `dims`, sorted by key.
///
/// With a positive `threshold`, groups costing less are dropped.
pub fn summarize_by(table: &CostTable, dims: &[Dimension], threshold: Option<Decimal>) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<Vec<String>, Decimal> = BTreeMap::new();
    for item in table.items() {
        let keys = dims.iter().map(|d| d.value_of(item)).collect();
        *groups.entry(keys).or_default() += item.cost;
    }

    groups
        .into_iter()
        .filter(|(_, cost)| above_threshold(*cost, threshold))
        .map(|(keys, cost)| SummaryRow { keys, cost })
        .collect()
}

fn above_threshold(cost: Decimal, threshold: Option<Decimal>) -> bool {
    match threshold {
        Some(t) if t > Decimal::ZERO => cost >= t,
        _ => true,
    }
}

// ============================================================================
// Pivot
// ============================================================================

/// A labelled row of per-period values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotRow {
    /// Dimension value.
    pub label: String,
    /// One value per pivot column.
    pub values: Vec<Decimal>,
}

impl PivotRow {
    /// Sum across all columns.
    pub fn total(&self) -> Decimal {
        self.values.iter().copied().sum()
    }

    /// Value of the last column, or zero.
    pub fn latest(&self) -> Decimal {
        self.values.last().copied().unwrap_or_default()
    }
}

/// Cost per dimension value per period start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pivot {
    /// Row label header.
    pub dimension: String,
    /// Period start dates, ascending.
    pub columns: Vec<NaiveDate>,
    /// Rows sorted by label. Missing cells are zero.
    pub rows: Vec<PivotRow>,
}

impl Pivot {
    /// Returns the row with the given label.
    pub fn row(&self, label: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pivots `table` into one row per value of `dim` and one column per period
/// start date.
///
/// Cells below a positive `threshold` are dropped before pivoting.
pub fn pivot(table: &CostTable, dim: &Dimension, threshold: Option<Decimal>) -> Pivot {
    let mut cells: BTreeMap<(String, NaiveDate), Decimal> = BTreeMap::new();
    for item in table.items() {
        *cells.entry((dim.value_of(item), item.start_date)).or_default() += item.cost;
    }
    cells.retain(|_, cost| above_threshold(*cost, threshold));

    let columns: Vec<NaiveDate> = cells
        .keys()
        .map(|(_, date)| *date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut rows: Vec<PivotRow> = Vec::new();
    for ((label, date), cost) in cells {
        if rows.last().is_none_or(|r| r.label != label) {
            rows.push(PivotRow {
                label,
                values: vec![Decimal::ZERO; columns.len()],
            });
        }
        if let (Some(row), Ok(col)) = (rows.last_mut(), columns.binary_search(&date)) {
            row.values[col] = cost;
        }
    }

    Pivot {
        dimension: dim.label().to_string(),
        columns,
        rows,
    }
}

// ============================================================================
// Cost Report
// ============================================================================

/// Which rows a [`CostReport`] keeps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    /// Every row.
    #[default]
    All,
    /// The union of the top `n` rows of every period column.
    Top(usize),
    /// The named rows that exist in the data.
    Named(Vec<String>),
}

/// A pivot limited to selected rows, with remainder and total rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostReport {
    /// Row label header.
    pub dimension: String,
    /// Period start dates, ascending.
    pub columns: Vec<NaiveDate>,
    /// Selected rows plus an optional `Other` row, sorted by the latest
    /// column descending.
    pub rows: Vec<PivotRow>,
    /// Per-column total of the whole input table.
    pub total: PivotRow,
}

impl CostReport {
    fn empty(dim: &Dimension) -> Self {
        Self {
            dimension: dim.label().to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            total: PivotRow {
                label: TOTAL_ROW.to_string(),
                values: Vec::new(),
            },
        }
    }

    /// Returns true if the report has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the row with the given label.
    pub fn row(&self, label: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.label == label)
    }
}

/// Builds a pivoted report of `table` by `dim`, keeping the rows picked by
/// `selector`.
///
/// Costs of unselected rows are folded into an `Other` row; remainders under
/// one cent count as zero and the row is left out when every remainder is
/// zero. The total row always reflects the whole table.
///
/// # Errors
///
/// Returns [`CoreError::EmptySelection`] if the selector keeps no rows of a
/// non-empty table.
pub fn cost_report(table: &CostTable, dim: &Dimension, selector: &Selector) -> Result<CostReport, CoreError> {
    if table.is_empty() {
        return Ok(CostReport::empty(dim));
    }

    let pivot = pivot(table, dim, None);
    let selected = select_rows(&pivot, selector);
    if selected.is_empty() {
        return Err(CoreError::EmptySelection);
    }

    let mut totals = vec![Decimal::ZERO; pivot.columns.len()];
    for item in table.items() {
        if let Ok(col) = pivot.columns.binary_search(&item.start_date) {
            totals[col] += item.cost;
        }
    }

    let mut rows: Vec<PivotRow> = pivot
        .rows
        .into_iter()
        .filter(|r| selected.contains(&r.label))
        .collect();

    let cent = Decimal::new(1, 2);
    let remainders: Vec<Decimal> = totals
        .iter()
        .enumerate()
        .map(|(col, total)| {
            let kept: Decimal = rows.iter().map(|r| r.values[col]).sum();
            let remainder = total - kept;
            if remainder.abs() < cent { Decimal::ZERO } else { remainder }
        })
        .collect();

    if remainders.iter().any(|r| !r.is_zero()) {
        rows.push(PivotRow {
            label: OTHER_ROW.to_string(),
            values: remainders,
        });
    }

    rows.sort_by(|a, b| b.latest().cmp(&a.latest()));

    debug!(
        dimension = %dim,
        rows = rows.len(),
        columns = pivot.columns.len(),
        "Built cost report"
    );

    Ok(CostReport {
        dimension: dim.label().to_string(),
        columns: pivot.columns,
        rows,
        total: PivotRow {
            label: TOTAL_ROW.to_string(),
            values: totals,
        },
    })
}

fn select_rows(pivot: &Pivot, selector: &Selector) -> BTreeSet<String> {
    match selector {
        Selector::All => pivot.rows.iter().map(|r| r.label.clone()).collect(),
        Selector::Top(n) => {
            let mut picked = BTreeSet::new();
            for col in 0..pivot.columns.len() {
                let mut ranked: Vec<&PivotRow> = pivot.rows.iter().collect();
                // Stable sort keeps label order among ties.
                ranked.sort_by(|a, b| b.values[col].cmp(&a.values[col]));
                picked.extend(ranked.into_iter().take(*n).map(|r| r.label.clone()));
            }
            picked
        }
        Selector::Named(names) => names
            .iter()
            .filter(|name| pivot.row(name).is_some())
            .cloned()
            .collect(),
    }
}

// ============================================================================
// Filtering
// ============================================================================

/// Keeps the rows matching every `(dimension, value)` filter, adding a
/// zero-cost filler row for each billing period that would otherwise vanish.
///
/// Filler rows carry the filtered values and empty strings elsewhere. The
/// result is re-indexed and ordered by start date.
///
/// # Errors
///
/// Returns [`CoreError::InvalidDateRange`] only if `table` holds a row with
/// an empty billing period.
pub fn filter_preserve_dates(table: &CostTable, filters: &[(Dimension, String)]) -> Result<CostTable, CoreError> {
    let filtered = table.filter(|item| filters.iter().all(|(dim, value)| dim.matches(item, value)));
    let kept: BTreeSet<_> = filtered.periods().into_iter().collect();

    let mut rows: Vec<LineItem> = Vec::new();
    for (start, end) in table.periods() {
        if kept.contains(&(start, end)) {
            continue;
        }
        let mut filler = LineItem::new("", "", start, end, Decimal::ZERO)?;
        for (dim, value) in filters {
            dim.assign(&mut filler, value);
        }
        rows.push(filler);
    }
    rows.extend(filtered.items().cloned());
    rows.sort_by_key(|item| item.start_date);

    let mut result = CostTable::new(table.schema().clone());
    for item in rows {
        result.push(item);
    }
    Ok(result)
}

// ============================================================================
// Tests
// ============================================================================
