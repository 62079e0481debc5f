// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # costlens Services
//!
//! Service plugins that categorize per-service usage costs.
//!
//! Each plugin declares a list of [`CategoryRule`]s. Categorization runs
//! the rules in order over the rows of the plugin's service, the first rule
//! to match a row claims it, and whatever is left goes to an `Other`
//! bucket. The result is a [`Rollup`](costlens_core::Rollup) whose total
//! always equals the service's input total.
//!
//! ## Built-in Services
//!
//! | Service | Abbreviation | Categories |
//! |---------|--------------|------------|
//! | Amazon Simple Storage Service | S3 | Storage, Requests, Data Transfer |
//! | Amazon Elastic Compute Cloud | EC2 | Usage, Data Transfer |
//! | EC2 - Other | EC2 Other | EBS, VPC, Data Transfer |
//! | Amazon Elastic File System | EFS | Infrequent, Standard |
//! | Amazon Relational Database Service | RDS | Backup, Storage, Compute, Data Transfer |
//!
//! ## Usage
//!
//! ```ignore
//! use costlens_services::ServiceRegistry;
//!
//! let registry = ServiceRegistry::with_builtin();
//! let s3 = registry.find("s3")?;
//! let rollup = s3.categorize_usage(&table);
//! ```

pub mod assemble;
pub mod error;
pub mod extract;
pub mod kind;
pub mod plugin;
pub mod registry;

// Service modules (alphabetical)
pub mod ec2;
pub mod ec2_other;
pub mod efs;
pub mod rds;
pub mod s3;

pub use assemble::{Assembler, CategoryGroup};
pub use error::RegistryError;
pub use extract::{Predicate, extract, strip_region_prefix};
pub use kind::ServiceKind;
pub use plugin::{CategoryRule, ServiceMetadata, ServicePlugin, SubtypeLabel, categorize_with};
pub use registry::ServiceRegistry;

// Re-export service plugins
pub use ec2::Ec2Plugin;
pub use ec2_other::Ec2OtherPlugin;
pub use efs::EfsPlugin;
pub use rds::RdsPlugin;
pub use s3::S3Plugin;
