//! Output formatting for CLI.

mod json;
mod text;

use costlens_core::{PeriodRollup, Rollup};

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// How a service's usage was rolled up.
#[derive(Debug, Clone)]
pub enum Breakdown {
    /// One rollup over every row.
    Whole(Rollup),
    /// One rollup per billing period.
    ByPeriod(Vec<PeriodRollup>),
}

impl Breakdown {
    /// Returns true if any rollup carries a reconciliation row.
    pub fn has_unclassified(&self) -> bool {
        match self {
            Breakdown::Whole(rollup) => rollup.has_unclassified(),
            Breakdown::ByPeriod(periods) => periods.iter().any(|p| p.rollup.has_unclassified()),
        }
    }
}

/// Categorization result of one service.
#[derive(Debug, Clone)]
pub struct Categorized {
    /// Cost Explorer service name.
    pub name: String,
    /// Service slug.
    pub shortname: String,
    /// Short display name.
    pub abbreviation: String,
    /// The rollup(s).
    pub breakdown: Breakdown,
}

#[cfg(test)]
mod tests;
