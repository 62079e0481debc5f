//! Amazon Elastic Compute Cloud.

use costlens_core::LineItem;
use rust_decimal::Decimal;

use crate::extract::{Predicate, strip_region_prefix};
use crate::plugin::{CategoryRule, ServiceMetadata, ServicePlugin};

/// Cost Explorer name of EC2.
pub const EC2_SERVICE_NAME: &str = "Amazon Elastic Compute Cloud";

/// Rows at or below a tenth of a cent are left to `Other`.
pub(crate) fn above_noise() -> Predicate {
    Predicate::cost_above(Decimal::new(1, 3))
}

/// Categorizes EC2 instance usage and data transfer.
#[derive(Debug, Clone)]
pub struct Ec2Plugin {
    metadata: ServiceMetadata,
    rules: Vec<CategoryRule>,
}

impl Ec2Plugin {
    /// Creates the plugin.
    pub fn new() -> Self {
        Self {
            metadata: ServiceMetadata::new(EC2_SERVICE_NAME, "EC2").with_alias("ec2-instances"),
            rules: vec![
                CategoryRule::derived("Usage", usage_kind, above_noise().and(Predicate::contains("Usage"))),
                CategoryRule::fixed(
                    "Data Transfer",
                    "Data Transfer",
                    above_noise().and(Predicate::contains("Byte")),
                ),
            ],
        }
    }
}

impl Default for Ec2Plugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ServicePlugin for Ec2Plugin {
    fn metadata(&self) -> &ServiceMetadata {
        &self.metadata
    }

    fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

/// `USE1-BoxUsage:t3.micro` -> `BoxUsage`.
fn usage_kind(item: &LineItem) -> String {
    let usage = strip_region_prefix(&item.usage_type);
    usage.split(':').next().unwrap_or(usage).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use costlens_core::{CostTable, OTHER_CATEGORY};
    use rust_decimal_macros::dec;

    fn item(usage: &str, cost: Decimal) -> LineItem {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        LineItem::new(EC2_SERVICE_NAME, usage, start, end, cost).unwrap()
    }

    #[test]
    fn test_usage_grouped_by_kind() {
        let table = CostTable::from_items([
            item("USE1-BoxUsage:t3.micro", dec!(4)),
            item("USW2-BoxUsage:m5.large", dec!(6)),
            item("USE1-SpotUsage:c5.xlarge", dec!(1.5)),
            item("USE1-DataTransfer-Out-Bytes", dec!(0.75)),
        ]);
        let rollup = Ec2Plugin::new().categorize_usage(&table);

        assert_eq!(rollup.get("Usage", "BoxUsage"), Some(dec!(10)));
        assert_eq!(rollup.get("Usage", "SpotUsage"), Some(dec!(1.5)));
        assert_eq!(rollup.get("Data Transfer", "Data Transfer"), Some(dec!(0.75)));
    }

    #[test]
    fn test_tiny_costs_fall_to_other() {
        let table = CostTable::from_items([item("USE1-BoxUsage:t3.nano", dec!(0.0005))]);
        let rollup = Ec2Plugin::new().categorize_usage(&table);
        assert_eq!(rollup.get(OTHER_CATEGORY, OTHER_CATEGORY), Some(dec!(0.0005)));
    }
}
