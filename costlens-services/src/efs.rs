//! Amazon Elastic File System.

use crate::extract::Predicate;
use crate::plugin::{CategoryRule, ServiceMetadata, ServicePlugin};

/// Cost Explorer name of EFS.
pub const EFS_SERVICE_NAME: &str = "Amazon Elastic File System";

/// Splits EFS usage into infrequent-access and standard.
#[derive(Debug, Clone)]
pub struct EfsPlugin {
    metadata: ServiceMetadata,
    rules: Vec<CategoryRule>,
}

impl EfsPlugin {
    /// Creates the plugin.
    pub fn new() -> Self {
        Self {
            metadata: ServiceMetadata::new(EFS_SERVICE_NAME, "EFS"),
            rules: vec![
                // Case-sensitive: lowercase "ia" occurs inside other words.
                CategoryRule::fixed("Infrequent", "Infrequent", Predicate::contains_exact("IA")),
                CategoryRule::fixed("Standard", "Standard", Predicate::All(Vec::new())),
            ],
        }
    }
}

impl Default for EfsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ServicePlugin for EfsPlugin {
    fn metadata(&self) -> &ServiceMetadata {
        &self.metadata
    }

    fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use costlens_core::{CostTable, LineItem, RollupRow};
    use rust_decimal_macros::dec;

    #[test]
    fn test_everything_is_either_infrequent_or_standard() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let table: CostTable = [
            ("USE1-TimedStorage-ByteHrs", dec!(5)),
            ("USE1-IATimedStorage-ByteHrs", dec!(1)),
            ("USE1-IADataAccess-Bytes", dec!(0.2)),
            ("USE1-ProvisionedTP-MiBpsHrs", dec!(2)),
        ]
        .into_iter()
        .map(|(u, c)| LineItem::new("EFS", u, start, end, c).unwrap())
        .collect();

        let rollup = EfsPlugin::new().categorize_usage(&table);
        assert_eq!(
            rollup.rows(),
            &[
                RollupRow::new("Infrequent", "Infrequent", dec!(1.2)),
                RollupRow::new("Standard", "Standard", dec!(7)),
            ]
        );
    }
}
