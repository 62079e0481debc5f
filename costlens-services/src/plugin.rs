//! The service plugin contract.
//!
//! A plugin knows which rows of a cost table belong to its service and how
//! to sort them into `(category, subtype)` buckets:
//! - [`ServiceMetadata`] - Display name, abbreviation, slug and aliases
//! - [`CategoryRule`] - One category, its subtype label and its predicate
//! - [`ServicePlugin`] - The trait every service implements
//!
//! The categorization itself lives in [`categorize_with`], shared by every
//! plugin.

use std::collections::BTreeSet;

use costlens_core::{CostTable, LineItem, OTHER_CATEGORY, PeriodRollup, Rollup, slugify};
use tracing::{debug, warn};

use crate::assemble::{Assembler, CategoryGroup};
use crate::extract::{Predicate, extract};

// ============================================================================
// Service Metadata
// ============================================================================

/// Static identity of a service plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMetadata {
    /// Service name exactly as Cost Explorer reports it.
    pub name: String,
    /// Short display name (e.g. "S3").
    pub abbreviation: String,
    /// File-safe slug, always `slugify(name)`.
    pub shortname: String,
    /// Extra names accepted when matching rows and CLI queries.
    pub aliases: Vec<String>,
}

impl ServiceMetadata {
    /// Creates metadata, deriving the slug from `name`.
    pub fn new(name: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            shortname: slugify(&name),
            name,
            abbreviation: abbreviation.into(),
            aliases: Vec::new(),
        }
    }

    /// Adds an alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Returns true if `value` names this service, ignoring case.
    pub fn is_named(&self, value: &str) -> bool {
        let value = value.trim();
        self.name.eq_ignore_ascii_case(value)
            || self.abbreviation.eq_ignore_ascii_case(value)
            || self.shortname.eq_ignore_ascii_case(value)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(value))
    }
}

// ============================================================================
// Category Rules
// ============================================================================

/// How a rule labels the subtype of the rows it claims.
#[derive(Debug, Clone)]
pub enum SubtypeLabel {
    /// The same label for every row.
    Fixed(String),
    /// A label computed from each row.
    Derived(fn(&LineItem) -> String),
}

/// One category of a plugin.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    /// Category label.
    pub category: String,
    /// Subtype labelling.
    pub subtype: SubtypeLabel,
    /// Which rows the rule claims.
    pub predicate: Predicate,
}

impl CategoryRule {
    /// A rule with a fixed subtype.
    pub fn fixed(category: impl Into<String>, subtype: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            category: category.into(),
            subtype: SubtypeLabel::Fixed(subtype.into()),
            predicate,
        }
    }

    /// A rule whose subtype is derived from each row.
    pub fn derived(category: impl Into<String>, label: fn(&LineItem) -> String, predicate: Predicate) -> Self {
        Self {
            category: category.into(),
            subtype: SubtypeLabel::Derived(label),
            predicate,
        }
    }

    /// Splits the claimed rows into groups, one per subtype in row order.
    ///
    /// An empty table still yields one empty group so zero fill can list the
    /// category.
    fn groups(&self, claimed: &CostTable) -> Vec<CategoryGroup> {
        match &self.subtype {
            SubtypeLabel::Fixed(label) => {
                vec![CategoryGroup::new(&self.category, label, claimed.clone())]
            }
            SubtypeLabel::Derived(_) if claimed.is_empty() => {
                vec![CategoryGroup::new(&self.category, &self.category, claimed.clone())]
            }
            SubtypeLabel::Derived(label_of) => {
                let mut labels: Vec<String> = Vec::new();
                for item in claimed.items() {
                    let label = label_of(item);
                    if !labels.contains(&label) {
                        labels.push(label);
                    }
                }
                labels
                    .into_iter()
                    .map(|label| {
                        let rows = claimed.filter(|item| label_of(item) == label);
                        CategoryGroup::new(&self.category, label, rows)
                    })
                    .collect()
            }
        }
    }
}

// ============================================================================
// Service Plugin Trait
// ============================================================================

/// A service-specific categorization strategy.
///
/// Implementors provide metadata and rules; the provided methods do the
/// rest. Categorization is a pure function of its input table.
pub trait ServicePlugin: Send + Sync {
    /// Returns the plugin's identity.
    fn metadata(&self) -> &ServiceMetadata;

    /// Returns the category rules in evaluation order.
    fn rules(&self) -> &[CategoryRule];

    /// Cost Explorer service name.
    fn name(&self) -> &str {
        &self.metadata().name
    }

    /// File-safe slug.
    fn shortname(&self) -> &str {
        &self.metadata().shortname
    }

    /// Short display name.
    fn abbreviation(&self) -> &str {
        &self.metadata().abbreviation
    }

    /// Returns true if a row with this service value belongs to the plugin.
    fn matches_service(&self, service: &str) -> bool {
        self.metadata().is_named(service)
    }

    /// Returns the rows of `table` that belong to the plugin.
    fn scope(&self, table: &CostTable) -> CostTable {
        table.filter(|item| self.matches_service(&item.service))
    }

    /// Categorizes the plugin's rows of `table` into a rollup.
    fn categorize_usage(&self, table: &CostTable) -> Rollup {
        categorize_with(self.metadata(), self.rules(), &self.scope(table), false)
    }

    /// Categorizes each billing period separately, listing every category in
    /// every period.
    fn categorize_usage_by_period(&self, table: &CostTable) -> Vec<PeriodRollup> {
        self.scope(table)
            .split_by_period()
            .into_iter()
            .map(|((start, end), part)| PeriodRollup {
                start,
                end,
                rollup: categorize_with(self.metadata(), self.rules(), &part, true),
            })
            .collect()
    }
}

// ============================================================================
// Categorization
// ============================================================================

/// Categorizes `scope`, the rows already selected for `metadata`'s service.
///
/// No service filtering happens here; pass [`ServicePlugin::scope`] of the
/// input. Rules run in order and the first rule to match a row claims it.
/// Rows no rule claims go to `("Other", "Other")`. The result always adds up
/// to `scope`'s total.
pub fn categorize_with(
    metadata: &ServiceMetadata,
    rules: &[CategoryRule],
    scope: &CostTable,
    zero_fill: bool,
) -> Rollup {
    if scope.is_empty() {
        debug!(service = %metadata.shortname, "No rows in scope");
        return Rollup::new();
    }

    let mut claimed: BTreeSet<usize> = BTreeSet::new();
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for rule in rules {
        let matched = extract(scope, &rule.predicate);
        let fresh = matched.filter_rows(|row| !claimed.contains(&row.index));

        let overlap = matched.len() - fresh.len();
        if overlap > 0 {
            warn!(
                service = %metadata.shortname,
                category = %rule.category,
                rows = overlap,
                "Rows already claimed by an earlier category"
            );
        }

        claimed.extend(fresh.rows().iter().map(|row| row.index));
        groups.extend(rule.groups(&fresh));
    }

    let unclaimed = scope.filter_rows(|row| !claimed.contains(&row.index));
    if !unclaimed.is_empty() {
        debug!(service = %metadata.shortname, rows = unclaimed.len(), "Unclaimed rows go to Other");
        groups.push(CategoryGroup::new(OTHER_CATEGORY, OTHER_CATEGORY, unclaimed));
    }

    Assembler::new()
        .zero_fill(zero_fill)
        .expect_total(scope.total_cost())
        .label(&metadata.shortname)
        .assemble(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct Toy {
        metadata: ServiceMetadata,
        rules: Vec<CategoryRule>,
    }

    impl ServicePlugin for Toy {
        fn metadata(&self) -> &ServiceMetadata {
            &self.metadata
        }

        fn rules(&self) -> &[CategoryRule] {
            &self.rules
        }
    }

    fn toy() -> Toy {
        Toy {
            metadata: ServiceMetadata::new("Toy Service", "TS").with_alias("toys"),
            rules: vec![
                CategoryRule::fixed("Alpha", "A", Predicate::contains("alpha")),
                CategoryRule::derived("Beta", |i| i.usage_type.to_uppercase(), Predicate::contains("beta")),
            ],
        }
    }

    fn row(service: &str, usage: &str, month: u32, cost: Decimal) -> LineItem {
        let start = NaiveDate::from_ymd_opt(2024, month, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, month + 1, 1).unwrap();
        LineItem::new(service, usage, start, end, cost).unwrap()
    }

    #[test]
    fn test_metadata_slug_and_names() {
        let plugin = toy();
        assert_eq!(plugin.shortname(), "toy-service");
        assert!(plugin.matches_service("toy service"));
        assert!(plugin.matches_service("ts"));
        assert!(plugin.matches_service("TOYS"));
        assert!(!plugin.matches_service("Toy"));
    }

    #[test]
    fn test_first_match_wins() {
        let table = CostTable::from_items([row("TS", "alpha-beta", 1, dec!(3)), row("TS", "beta", 1, dec!(2))]);
        let rollup = toy().categorize_usage(&table);

        assert_eq!(rollup.get("Alpha", "A"), Some(dec!(3)));
        assert_eq!(rollup.get("Beta", "BETA"), Some(dec!(2)));
        assert_eq!(rollup.total(), dec!(5));
    }

    #[test]
    fn test_unmatched_rows_go_to_other_and_out_of_scope_excluded() {
        let table = CostTable::from_items([
            row("TS", "gamma", 1, dec!(1.25)),
            row("Other Service", "alpha", 1, dec!(100)),
        ]);
        let rollup = toy().categorize_usage(&table);
        assert_eq!(rollup.len(), 1);
        assert_eq!(rollup.get(OTHER_CATEGORY, OTHER_CATEGORY), Some(dec!(1.25)));
    }

    #[test]
    fn test_by_period_zero_fills_categories() {
        let table = CostTable::from_items([row("TS", "alpha", 1, dec!(1)), row("TS", "beta", 2, dec!(2))]);
        let periods = toy().categorize_usage_by_period(&table);

        assert_eq!(periods.len(), 2);
        let jan = &periods[0].rollup;
        assert_eq!(jan.get("Alpha", "A"), Some(dec!(1)));
        assert_eq!(jan.get("Beta", "Beta"), Some(dec!(0)));
        let feb = &periods[1].rollup;
        assert_eq!(feb.get("Alpha", "A"), Some(dec!(0)));
        assert_eq!(feb.get("Beta", "BETA"), Some(dec!(2)));
    }

    struct Legacy(Toy);

    impl ServicePlugin for Legacy {
        fn metadata(&self) -> &ServiceMetadata {
            &self.0.metadata
        }

        fn rules(&self) -> &[CategoryRule] {
            &self.0.rules
        }

        fn matches_service(&self, service: &str) -> bool {
            self.metadata().is_named(service) || service == "Toy Service (Legacy)"
        }
    }

    #[test]
    fn test_overridden_service_match_is_categorized() {
        let plugin = Legacy(toy());
        let table = CostTable::from_items([
            row("Toy Service", "alpha", 1, dec!(1)),
            row("Toy Service (Legacy)", "beta", 2, dec!(5)),
            row("Elsewhere", "alpha", 1, dec!(100)),
        ]);
        let scoped = plugin.scope(&table).total_cost();
        assert_eq!(scoped, dec!(6));

        let rollup = plugin.categorize_usage(&table);
        assert_eq!(rollup.total(), scoped);
        assert_eq!(rollup.get("Beta", "BETA"), Some(dec!(5)));
        assert!(!rollup.has_unclassified());

        let by_period: Decimal = plugin
            .categorize_usage_by_period(&table)
            .iter()
            .map(|p| p.rollup.total())
            .sum();
        assert_eq!(by_period, scoped);
    }

    #[test]
    fn test_rows_claimed_twice_count_once() {
        let table = CostTable::from_items([
            row("TS", "alpha-beta", 1, dec!(4)),
            row("TS", "beta-alpha", 1, dec!(6)),
        ]);
        let rollup = toy().categorize_usage(&table);

        assert_eq!(rollup.get("Alpha", "A"), Some(dec!(10)));
        assert_eq!(rollup.get("Beta", "Beta"), None);
        assert_eq!(rollup.total(), dec!(10));
        assert!(!rollup.has_unclassified());
    }

    #[test]
    fn test_empty_scope_gives_empty_rollup() {
        let table = CostTable::from_items([row("Elsewhere", "alpha", 1, dec!(1))]);
        assert!(toy().categorize_usage(&table).is_empty());
        assert!(toy().categorize_usage_by_period(&table).is_empty());
    }
}
