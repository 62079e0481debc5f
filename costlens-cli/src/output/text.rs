//! Text output formatting with aligned columns and colors.

use std::path::Path;

use costlens_core::{
    CostReport, CostTable, Dimension, OTHER_ROW, PeriodRollup, Rollup, SummaryRow, TOTAL_ROW,
    UNCLASSIFIED_CATEGORY,
};
use costlens_services::ServicePlugin;
use rust_decimal::Decimal;

use super::{Breakdown, Categorized};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

const MONEY_WIDTH: usize = 14;
const CATEGORY_WIDTH: usize = 16;
const SUBTYPE_WIDTH: usize = 28;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ========================================================================
    // Services
    // ========================================================================

    /// Formats the service list header.
    pub fn format_services_header(&self) -> String {
        self.bold(&format!(
            "{:<36} {:<10} {:<36} {}",
            "Service", "Short", "Slug", "Categories"
        ))
    }

    /// Formats a single service line.
    pub fn format_service_line(&self, plugin: &dyn ServicePlugin) -> String {
        let mut categories: Vec<&str> = Vec::new();
        for rule in plugin.rules() {
            if !categories.contains(&rule.category.as_str()) {
                categories.push(&rule.category);
            }
        }

        format!(
            "{:<36} {:<10} {} {}",
            plugin.name(),
            plugin.abbreviation(),
            self.cyan(&format!("{:<36}", plugin.shortname())),
            categories.join(", ")
        )
    }

    // ========================================================================
    // Categorization
    // ========================================================================

    /// Formats one service's rollup(s).
    pub fn format_categorized(&self, result: &Categorized) -> String {
        let mut lines = vec![format!(
            "{} ({})",
            self.bold(&result.abbreviation),
            self.dim(&result.shortname)
        )];
        lines.push("─".repeat(CATEGORY_WIDTH + SUBTYPE_WIDTH + MONEY_WIDTH + 4));

        match &result.breakdown {
            Breakdown::Whole(rollup) => lines.extend(self.rollup_lines(rollup)),
            Breakdown::ByPeriod(periods) if periods.is_empty() => lines.push(self.dim("No usage rows")),
            Breakdown::ByPeriod(periods) => {
                for (i, period) in periods.iter().enumerate() {
                    if i > 0 {
                        lines.push(String::new());
                    }
                    lines.push(self.period_heading(period));
                    lines.extend(self.rollup_lines(&period.rollup));
                }
            }
        }

        lines.join("\n")
    }

    fn period_heading(&self, period: &PeriodRollup) -> String {
        self.bold(&format!("{} .. {}", period.start, period.end))
    }

    fn rollup_lines(&self, rollup: &Rollup) -> Vec<String> {
        if rollup.is_empty() {
            return vec![self.dim("No usage rows")];
        }

        let mut lines: Vec<String> = rollup
            .rows()
            .iter()
            .map(|row| {
                let line = format!(
                    "  {:<cw$} {:<sw$} {:>mw$}",
                    row.category,
                    row.subtype,
                    format_money(row.cost),
                    cw = CATEGORY_WIDTH,
                    sw = SUBTYPE_WIDTH,
                    mw = MONEY_WIDTH
                );
                if row.category == UNCLASSIFIED_CATEGORY {
                    self.yellow(&line)
                } else {
                    line
                }
            })
            .collect();

        lines.push(self.bold(&format!(
            "  {:<w$} {:>mw$}",
            TOTAL_ROW,
            format_money(rollup.total()),
            w = CATEGORY_WIDTH + SUBTYPE_WIDTH + 1,
            mw = MONEY_WIDTH
        )));
        lines
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// Formats a pivoted cost report, one column per period.
    pub fn format_report(&self, report: &CostReport) -> String {
        if report.is_empty() {
            return self.dim("No cost rows");
        }

        let width = report
            .rows
            .iter()
            .map(|r| r.label.chars().count())
            .chain([report.dimension.chars().count(), TOTAL_ROW.len(), 10])
            .max()
            .unwrap_or(10);

        let mut header = format!("{:<width$}", report.dimension);
        for column in &report.columns {
            header.push_str(&format!(" {:>MONEY_WIDTH$}", column.format("%Y-%m-%d").to_string()));
        }

        let mut lines = vec![self.bold(&header)];
        lines.push("─".repeat(width + (MONEY_WIDTH + 1) * report.columns.len()));

        for row in &report.rows {
            let line = self.value_line(&row.label, &row.values, width);
            if row.label == OTHER_ROW {
                lines.push(self.dim(&line));
            } else {
                lines.push(line);
            }
        }

        lines.push(self.bold(&self.value_line(&report.total.label, &report.total.values, width)));
        lines.join("\n")
    }

    fn value_line(&self, label: &str, values: &[Decimal], width: usize) -> String {
        let mut line = format!("{label:<width$}");
        for value in values {
            line.push_str(&format!(" {:>MONEY_WIDTH$}", format_money(*value)));
        }
        line
    }

    /// Formats total cost per dimension value.
    pub fn format_summary(&self, dimension: &Dimension, rows: &[SummaryRow]) -> String {
        if rows.is_empty() {
            return self.dim("No cost rows");
        }

        let labels: Vec<String> = rows.iter().map(|r| r.keys.join(" / ")).collect();
        let width = labels
            .iter()
            .map(|l| l.chars().count())
            .chain([dimension.label().len(), TOTAL_ROW.len()])
            .max()
            .unwrap_or_default();

        let mut lines = vec![self.bold(&format!("{:<width$} {:>MONEY_WIDTH$}", dimension.label(), "Cost"))];
        lines.push("─".repeat(width + MONEY_WIDTH + 1));
        for (label, row) in labels.iter().zip(rows) {
            lines.push(format!("{label:<width$} {:>MONEY_WIDTH$}", format_money(row.cost)));
        }

        let total: Decimal = rows.iter().map(|r| r.cost).sum();
        lines.push(self.bold(&format!("{TOTAL_ROW:<width$} {:>MONEY_WIDTH$}", format_money(total))));
        lines.join("\n")
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Formats the result of converting Cost Explorer pages.
    pub fn format_conversion(&self, output: &Path, pages: usize, table: &CostTable) -> String {
        format!(
            "Converted {} page(s) into {} rows over {} period(s), total {}\nWrote {}",
            pages,
            table.len(),
            table.periods().len(),
            self.green(&format_money(table.total_cost())),
            self.cyan(&output.display().to_string())
        )
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Formats an amount as dollars with two decimals and thousands separators.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let digits = format!("{:.2}", rounded.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{fraction}")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(0)), "$0.00");
        assert_eq!(format_money(dec!(12.5)), "$12.50");
        assert_eq!(format_money(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_money(dec!(-3.20)), "-$3.20");
        assert_eq!(format_money(dec!(-0.001)), "$0.00");
        assert_eq!(format_money(dec!(999.999)), "$1,000.00");
    }

    #[test]
    fn test_colors_disabled() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.bold("x"), "x");
        assert_eq!(formatter.yellow("x"), "x");
    }

    #[test]
    fn test_colors_enabled() {
        let formatter = TextFormatter::new(true);
        assert_eq!(formatter.bold("x"), "\x1b[1mx\x1b[0m");
        assert!(formatter.dim("x").starts_with(DIM));
    }
}
