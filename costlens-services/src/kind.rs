//! The built-in services.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ec2::Ec2Plugin;
use crate::ec2_other::Ec2OtherPlugin;
use crate::efs::EfsPlugin;
use crate::plugin::ServicePlugin;
use crate::rds::RdsPlugin;
use crate::s3::S3Plugin;

/// Services costlens ships a plugin for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// Amazon Simple Storage Service
    S3,
    /// Amazon Elastic Compute Cloud
    Ec2,
    /// EC2 - Other
    Ec2Other,
    /// Amazon Elastic File System
    Efs,
    /// Amazon Relational Database Service
    Rds,
}

impl ServiceKind {
    /// Returns all built-in kinds in registration order.
    pub fn all() -> &'static [ServiceKind] {
        &[Self::S3, Self::Ec2, Self::Ec2Other, Self::Efs, Self::Rds]
    }

    /// Returns the short display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::S3 => "S3",
            Self::Ec2 => "EC2",
            Self::Ec2Other => "EC2 Other",
            Self::Efs => "EFS",
            Self::Rds => "RDS",
        }
    }

    /// Builds this kind's plugin.
    pub fn plugin(&self) -> Box<dyn ServicePlugin> {
        match self {
            Self::S3 => Box::new(S3Plugin::new()),
            Self::Ec2 => Box::new(Ec2Plugin::new()),
            Self::Ec2Other => Box::new(Ec2OtherPlugin::new()),
            Self::Efs => Box::new(EfsPlugin::new()),
            Self::Rds => Box::new(RdsPlugin::new()),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
