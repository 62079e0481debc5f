//! Categorized cost summaries.
//!
//! A [`Rollup`] is the output of a service plugin: one row per
//! `(category, subtype)` pair, in a fixed order.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category of in-scope rows that no rule matched.
pub const OTHER_CATEGORY: &str = "Other";

/// Category of the reconciliation row added when a rollup does not add up
/// to its input.
pub const UNCLASSIFIED_CATEGORY: &str = "Unclassified";

// ============================================================================
// Rollup Row
// ============================================================================

/// A single `(category, subtype, cost)` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RollupRow {
    /// Top-level category (e.g. "Storage").
    pub category: String,
    /// Subtype within the category (e.g. "Standard").
    pub subtype: String,
    /// Summed cost.
    pub cost: Decimal,
}

impl RollupRow {
    /// Creates a row.
    pub fn new(category: impl Into<String>, subtype: impl Into<String>, cost: Decimal) -> Self {
        Self {
            category: category.into(),
            subtype: subtype.into(),
            cost,
        }
    }
}

// ============================================================================
// Rollup
// ============================================================================

/// Ordered `(category, subtype, cost)` rows for one service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rollup {
    rows: Vec<RollupRow>,
}

impl Rollup {
    /// Column names of a rollup, in order.
    pub const COLUMNS: [&'static str; 3] = ["category", "subtype", "cost"];

    /// Creates an empty rollup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rollup from rows, keeping their order.
    pub fn from_rows(rows: Vec<RollupRow>) -> Self {
        Self { rows }
    }

    /// Appends a row.
    pub fn push(&mut self, row: RollupRow) {
        self.rows.push(row);
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[RollupRow] {
        &self.rows
    }

    /// Consumes the rollup, returning its rows.
    pub fn into_rows(self) -> Vec<RollupRow> {
        self.rows
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the sum of all rows.
    pub fn total(&self) -> Decimal {
        self.rows.iter().map(|r| r.cost).sum()
    }

    /// Returns the cost of one `(category, subtype)` pair.
    pub fn get(&self, category: &str, subtype: &str) -> Option<Decimal> {
        self.rows
            .iter()
            .find(|r| r.category == category && r.subtype == subtype)
            .map(|r| r.cost)
    }

    /// Returns the distinct categories in row order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.category.as_str()) {
                seen.push(&row.category);
            }
        }
        seen
    }

    /// Returns the total per category, in row order.
    pub fn category_totals(&self) -> Vec<(String, Decimal)> {
        self.categories()
            .into_iter()
            .map(|category| {
                let total = self
                    .rows
                    .iter()
                    .filter(|r| r.category == category)
                    .map(|r| r.cost)
                    .sum();
                (category.to_string(), total)
            })
            .collect()
    }

    /// Returns true if a reconciliation row is present.
    pub fn has_unclassified(&self) -> bool {
        self.rows.iter().any(|r| r.category == UNCLASSIFIED_CATEGORY)
    }
}

// ============================================================================
// Period Rollup
// ============================================================================

/// A rollup limited to one billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRollup {
    /// First day of the period.
    pub start: NaiveDate,
    /// Day after the last day of the period.
    pub end: NaiveDate,
    /// Rollup of the rows billed in the period.
    pub rollup: Rollup,
}

// ============================================================================
// Tests
// ============================================================================
