//! Category rollup assembler.
//!
//! Turns labelled extractor outputs into a [`Rollup`]. Rows are ordered by
//! the first appearance of each `(category, subtype)` pair in the input, and
//! repeated labels are merged.

use costlens_core::{CostTable, Rollup, RollupRow, UNCLASSIFIED_CATEGORY};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Extractor output labelled with its category and subtype.
#[derive(Debug, Clone)]
pub struct CategoryGroup {
    /// Category label.
    pub category: String,
    /// Subtype label.
    pub subtype: String,
    /// Rows in the group.
    pub table: CostTable,
}

impl CategoryGroup {
    /// Creates a group.
    pub fn new(category: impl Into<String>, subtype: impl Into<String>, table: CostTable) -> Self {
        Self {
            category: category.into(),
            subtype: subtype.into(),
            table,
        }
    }
}

// ============================================================================
// Assembler
// ============================================================================

/// Builds a [`Rollup`] from [`CategoryGroup`]s.
///
/// # Example
///
/// ```ignore
/// let rollup = Assembler::new()
///     .zero_fill(true)
///     .expect_total(scope.total_cost())
///     .assemble(groups);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    zero_fill: bool,
    expected_total: Option<Decimal>,
    label: Option<String>,
}

impl Assembler {
    /// Creates an assembler with zero fill and reconciliation off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps a zero row for a category whose groups were all empty.
    #[must_use]
    pub fn zero_fill(mut self, enabled: bool) -> Self {
        self.zero_fill = enabled;
        self
    }

    /// Checks the assembled total against `total`, appending an
    /// `Unclassified` row for any difference.
    #[must_use]
    pub fn expect_total(mut self, total: Decimal) -> Self {
        self.expected_total = Some(total);
        self
    }

    /// Names the rollup in log output.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sums every group into rollup rows.
    pub fn assemble<I>(&self, groups: I) -> Rollup
    where
        I: IntoIterator<Item = CategoryGroup>,
    {
        let label = self.label.as_deref().unwrap_or("rollup");

        // Entries in first-appearance order; `None` marks a label seen only
        // with empty tables.
        let mut entries: Vec<(String, String, Option<Decimal>)> = Vec::new();

        for group in groups {
            let cost = (!group.table.is_empty()).then(|| group.table.total_cost());
            match entries
                .iter_mut()
                .find(|(c, s, _)| *c == group.category && *s == group.subtype)
            {
                Some((_, _, total)) => {
                    if let Some(cost) = cost {
                        *total = Some(total.unwrap_or_default() + cost);
                    }
                }
                None => entries.push((group.category, group.subtype, cost)),
            }
        }

        let mut filled: Vec<&str> = Vec::new();
        let mut rows: Vec<RollupRow> = Vec::new();
        for (category, subtype, cost) in &entries {
            match cost {
                Some(cost) => rows.push(RollupRow::new(category, subtype, *cost)),
                None if self.zero_fill => {
                    let has_rows = entries.iter().any(|(c, _, t)| c == category && t.is_some());
                    if !has_rows && !filled.contains(&category.as_str()) {
                        filled.push(category);
                        rows.push(RollupRow::new(category, subtype, Decimal::ZERO));
                    }
                }
                None => {}
            }
        }

        let mut rollup = Rollup::from_rows(rows);

        if let Some(expected) = self.expected_total {
            let difference = expected - rollup.total();
            if !difference.is_zero() {
                warn!(
                    rollup = label,
                    expected = %expected,
                    assembled = %rollup.total(),
                    difference = %difference,
                    "Rollup does not match input total, adding reconciliation row"
                );
                rollup.push(RollupRow::new(
                    UNCLASSIFIED_CATEGORY,
                    UNCLASSIFIED_CATEGORY,
                    difference,
                ));
            }
        }

        debug!(rollup = label, rows = rollup.len(), total = %rollup.total(), "Assembled rollup");
        rollup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use costlens_core::LineItem;
    use rust_decimal_macros::dec;

    fn table(costs: &[Decimal]) -> CostTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        costs
            .iter()
            .map(|c| LineItem::new("S3", "x", start, end, *c).unwrap())
            .collect()
    }

    #[test]
    fn test_merges_duplicate_labels_in_first_appearance_order() {
        let rollup = Assembler::new().assemble([
            CategoryGroup::new("Requests", "Tier1", table(&[dec!(1)])),
            CategoryGroup::new("Storage", "Standard", table(&[dec!(5), dec!(5)])),
            CategoryGroup::new("Requests", "Tier1", table(&[dec!(0.5)])),
        ]);
        assert_eq!(
            rollup.rows(),
            &[
                RollupRow::new("Requests", "Tier1", dec!(1.5)),
                RollupRow::new("Storage", "Standard", dec!(10)),
            ]
        );
    }

    #[test]
    fn test_empty_groups_dropped_without_zero_fill() {
        let rollup = Assembler::new().assemble([
            CategoryGroup::new("Storage", "Standard", table(&[])),
            CategoryGroup::new("Requests", "Tier1", table(&[dec!(2)])),
        ]);
        assert_eq!(rollup.len(), 1);
    }

    #[test]
    fn test_zero_fill_only_for_categories_without_rows() {
        let rollup = Assembler::new().zero_fill(true).assemble([
            CategoryGroup::new("Storage", "Standard", table(&[])),
            CategoryGroup::new("Requests", "Tier1", table(&[dec!(2)])),
            CategoryGroup::new("Requests", "Tier2", table(&[])),
        ]);
        assert_eq!(
            rollup.rows(),
            &[
                RollupRow::new("Storage", "Standard", dec!(0)),
                RollupRow::new("Requests", "Tier1", dec!(2)),
            ]
        );
    }

    #[test]
    fn test_reconciliation_row_on_mismatch() {
        let rollup = Assembler::new()
            .expect_total(dec!(12.50))
            .assemble([CategoryGroup::new("Storage", "Standard", table(&[dec!(10)]))]);
        assert!(rollup.has_unclassified());
        assert_eq!(rollup.get(UNCLASSIFIED_CATEGORY, UNCLASSIFIED_CATEGORY), Some(dec!(2.50)));
        assert_eq!(rollup.total(), dec!(12.50));
    }

    #[test]
    fn test_no_reconciliation_when_totals_match() {
        let rollup = Assembler::new()
            .expect_total(dec!(10))
            .assemble([CategoryGroup::new("Storage", "Standard", table(&[dec!(10)]))]);
        assert!(!rollup.has_unclassified());
    }
}
