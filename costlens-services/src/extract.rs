//! Usage extractors.
//!
//! A [`Predicate`] selects rows of a [`CostTable`]; [`extract`] applies it
//! and returns a new table with the same schema and row indices. Extractors
//! never rewrite the rows they select, so every output is a valid input to
//! another extractor.

use std::sync::LazyLock;

use costlens_core::{CostTable, LineItem};
use regex::Regex;
use rust_decimal::Decimal;

/// Region prefix of a usage type, e.g. `USE1-` or `EUC1-`.
static REGION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,}\d-").expect("Invalid regex"));

// ============================================================================
// Predicate
// ============================================================================

/// A row selection rule.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Usage type contains `needle`.
    UsageContains {
        /// Substring to look for.
        needle: String,
        /// Whether the match is case-sensitive.
        case_sensitive: bool,
    },
    /// Usage type ends with the suffix (case-sensitive).
    UsageEndsWith(String),
    /// Usage type matches the regex anywhere.
    UsageMatches(Regex),
    /// Service is one of the names (case-insensitive).
    ServiceIn(Vec<String>),
    /// Cost is strictly greater than the amount.
    CostAbove(Decimal),
    /// Negation.
    Not(Box<Predicate>),
    /// Every predicate holds. Empty means always.
    All(Vec<Predicate>),
    /// At least one predicate holds. Empty means never.
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Case-insensitive substring match on the usage type.
    pub fn contains(needle: impl Into<String>) -> Self {
        Self::UsageContains {
            needle: needle.into(),
            case_sensitive: false,
        }
    }

    /// Case-sensitive substring match on the usage type.
    pub fn contains_exact(needle: impl Into<String>) -> Self {
        Self::UsageContains {
            needle: needle.into(),
            case_sensitive: true,
        }
    }

    /// Suffix match on the usage type.
    pub fn ends_with(suffix: impl Into<String>) -> Self {
        Self::UsageEndsWith(suffix.into())
    }

    /// Case-insensitive regex match on the usage type.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regex. Patterns are compile-time
    /// literals in the built-in plugins.
    pub fn matches(pattern: &str) -> Self {
        let regex = Regex::new(&format!("(?i){pattern}"))
            .unwrap_or_else(|e| panic!("invalid usage pattern {pattern:?}: {e}"));
        Self::UsageMatches(regex)
    }

    /// Cost greater than `amount`.
    pub fn cost_above(amount: Decimal) -> Self {
        Self::CostAbove(amount)
    }

    /// Negates a predicate.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Conjunction with another predicate.
    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Self::All(mut preds) => {
                preds.push(other);
                Self::All(preds)
            }
            first => Self::All(vec![first, other]),
        }
    }

    /// Disjunction with another predicate.
    #[must_use]
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Self::Any(mut preds) => {
                preds.push(other);
                Self::Any(preds)
            }
            first => Self::Any(vec![first, other]),
        }
    }

    /// Evaluates the predicate against one line item.
    pub fn test(&self, item: &LineItem) -> bool {
        match self {
            Self::UsageContains {
                needle,
                case_sensitive: true,
            } => item.usage_type.contains(needle.as_str()),
            Self::UsageContains {
                needle,
                case_sensitive: false,
            } => item
                .usage_type
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Self::UsageEndsWith(suffix) => item.usage_type.ends_with(suffix.as_str()),
            Self::UsageMatches(regex) => regex.is_match(&item.usage_type),
            Self::ServiceIn(names) => names.iter().any(|n| n.eq_ignore_ascii_case(&item.service)),
            Self::CostAbove(amount) => item.cost > *amount,
            Self::Not(inner) => !inner.test(item),
            Self::All(preds) => preds.iter().all(|p| p.test(item)),
            Self::Any(preds) => preds.iter().any(|p| p.test(item)),
        }
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Returns the rows of `table` matching `predicate`.
///
/// The schema and row indices are unchanged, even when nothing matches.
pub fn extract(table: &CostTable, predicate: &Predicate) -> CostTable {
    table.filter(|item| predicate.test(item))
}

/// Removes a leading region code such as `USE1-` from a usage type.
///
/// Only used to derive labels; table rows keep their original usage type.
pub fn strip_region_prefix(usage_type: &str) -> &str {
    match REGION_PREFIX.find(usage_type) {
        Some(m) => &usage_type[m.end()..],
        None => usage_type,
    }
}
