//! Amazon Relational Database Service.

use crate::extract::Predicate;
use crate::plugin::{CategoryRule, ServiceMetadata, ServicePlugin};

/// Cost Explorer name of RDS.
pub const RDS_SERVICE_NAME: &str = "Amazon Relational Database Service";

/// Categorizes RDS usage into backup, storage, compute and data transfer.
#[derive(Debug, Clone)]
pub struct RdsPlugin {
    metadata: ServiceMetadata,
    rules: Vec<CategoryRule>,
}

impl RdsPlugin {
    /// Creates the plugin.
    pub fn new() -> Self {
        Self {
            metadata: ServiceMetadata::new(RDS_SERVICE_NAME, "RDS"),
            rules: vec![
                CategoryRule::fixed("Backup", "Backup", Predicate::contains("BackupUsage")),
                CategoryRule::fixed("Storage", "Storage", Predicate::contains("Storage")),
                CategoryRule::fixed("Compute", "Compute", Predicate::matches("InstanceUsage|Serverless")),
                CategoryRule::fixed("Data Transfer", "Data Transfer", Predicate::ends_with("Bytes")),
            ],
        }
    }
}

impl Default for RdsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ServicePlugin for RdsPlugin {
    fn metadata(&self) -> &ServiceMetadata {
        &self.metadata
    }

    fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}
