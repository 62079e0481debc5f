//! EC2 - Other: EBS, NAT gateways and VPC data transfer.

use costlens_core::LineItem;

use crate::ec2::above_noise;
use crate::extract::Predicate;
use crate::plugin::{CategoryRule, ServiceMetadata, ServicePlugin};

/// Cost Explorer name of the EC2 - Other bucket.
pub const EC2_OTHER_SERVICE_NAME: &str = "EC2 - Other";

/// Categorizes the `EC2 - Other` service.
#[derive(Debug, Clone)]
pub struct Ec2OtherPlugin {
    metadata: ServiceMetadata,
    rules: Vec<CategoryRule>,
}

impl Ec2OtherPlugin {
    /// Creates the plugin.
    pub fn new() -> Self {
        let ebs = above_noise()
            .and(Predicate::contains_exact("EBS"))
            .and(Predicate::contains_exact("EBSOptimized").not());
        let nat = above_noise().and(Predicate::contains("NatGateway"));
        let transfer = above_noise().and(Predicate::contains("DataTransfer").or(Predicate::contains("VpcPeering")));

        Self {
            metadata: ServiceMetadata::new(EC2_OTHER_SERVICE_NAME, "EC2 Other"),
            rules: vec![
                CategoryRule::derived("EBS", ebs_kind, ebs),
                CategoryRule::derived("VPC", nat_kind, nat),
                CategoryRule::fixed("Data Transfer", "Data Transfer", transfer),
            ],
        }
    }
}

impl Default for Ec2OtherPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ServicePlugin for Ec2OtherPlugin {
    fn metadata(&self) -> &ServiceMetadata {
        &self.metadata
    }

    fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

fn ebs_kind(item: &LineItem) -> String {
    let usage = item.usage_type.to_lowercase();
    let label = if usage.contains("volumeusage") {
        "EBS Volume"
    } else if usage.contains("snapshotusage") {
        "EBS Snapshot"
    } else if usage.contains("throughput") || usage.contains("iops") {
        "EBS Throughput"
    } else {
        "Other"
    };
    label.to_string()
}

fn nat_kind(item: &LineItem) -> String {
    let usage = item.usage_type.to_lowercase();
    let label = if usage.contains("hours") {
        "NAT Gateway Hours"
    } else if usage.contains("bytes") {
        "NAT Gateway Bytes"
    } else {
        "Other"
    };
    label.to_string()
}
