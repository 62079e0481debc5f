//! Amazon Simple Storage Service.

use costlens_core::LineItem;

use crate::extract::{Predicate, strip_region_prefix};
use crate::plugin::{CategoryRule, ServiceMetadata, ServicePlugin};

/// Cost Explorer name of S3.
pub const S3_SERVICE_NAME: &str = "Amazon Simple Storage Service";

/// Categorizes S3 usage into storage, requests and data transfer.
#[derive(Debug, Clone)]
pub struct S3Plugin {
    metadata: ServiceMetadata,
    rules: Vec<CategoryRule>,
}

impl S3Plugin {
    /// Creates the plugin.
    pub fn new() -> Self {
        Self {
            metadata: ServiceMetadata::new(S3_SERVICE_NAME, "S3"),
            rules: vec![
                CategoryRule::derived("Storage", storage_class, Predicate::contains("TimedStorage")),
                CategoryRule::derived("Requests", request_tier, Predicate::contains("Requests-Tier")),
                CategoryRule::derived("Data Transfer", transfer_direction, Predicate::ends_with("Bytes")),
            ],
        }
    }
}

impl Default for S3Plugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ServicePlugin for S3Plugin {
    fn metadata(&self) -> &ServiceMetadata {
        &self.metadata
    }

    fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

/// Maps `TimedStorage-<class>-ByteHrs` to a storage class name.
fn storage_class(item: &LineItem) -> String {
    let usage = strip_region_prefix(&item.usage_type);
    let class = usage
        .find("TimedStorage-")
        .map_or(usage, |i| &usage[i + "TimedStorage-".len()..]);

    let label = if class.starts_with("GIR") {
        "Glacier Instant Retrieval"
    } else if class.starts_with("GDA") {
        "Glacier Deep Archive"
    } else if class.starts_with("Glacier") {
        "Glacier"
    } else if class.starts_with("SIA") {
        "Standard-IA"
    } else if class.starts_with("ZIA") {
        "One Zone-IA"
    } else if class.starts_with("INT") {
        "Intelligent-Tiering"
    } else if class.starts_with("RRS") {
        "Reduced Redundancy"
    } else if class.starts_with("ByteHrs") {
        "Standard"
    } else {
        "Other"
    };
    label.to_string()
}

/// `Requests-Tier1` -> `Tier1`.
fn request_tier(item: &LineItem) -> String {
    let usage = &item.usage_type;
    let Some(start) = usage.find("Tier") else {
        return "Other".to_string();
    };
    let tier: String = usage[start + "Tier".len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    if tier.is_empty() { "Other".to_string() } else { format!("Tier{tier}") }
}

fn transfer_direction(item: &LineItem) -> String {
    let usage = &item.usage_type;
    let label = if usage.contains("-In-") {
        "In"
    } else if usage.contains("-Out-") {
        "Out"
    } else if usage.contains("Regional") {
        "Regional"
    } else {
        "Other"
    };
    label.to_string()
}
