//! Subscription tiers and the limits they grant.

use std::{fmt, time::Duration};

use serde::Serialize;

use crate::error::{GovernorError, Result};

/// Attribute value meaning "no limit".
const UNLIMITED: &str = "-1";

/// Paid subscription tier, read from the `Package` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Single developer package.
    Developer,
    /// Small team package.
    Team,
    /// Project package, unlimited runner lifetime.
    Project,
    /// Enterprise package, unlimited runner lifetime.
    Enterprise,
}

impl Tier {
    /// All known tiers.
    pub const ALL: [Self; 4] = [Self::Developer, Self::Team, Self::Project, Self::Enterprise];

    /// Looks up a tier by package name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `GovernorError::NotFound` if the package is not a known tier.
    ///
    /// # Examples
    ///
    /// ```
    /// use quota_governor::policy::Tier;
    ///
    /// assert_eq!(Tier::lookup("Enterprise").unwrap(), Tier::Enterprise);
    /// assert!(Tier::lookup("gold").is_err());
    /// ```
    pub fn lookup(package: &str) -> Result<Self> {
        match package.to_lowercase().as_str() {
            "developer" => Ok(Self::Developer),
            "team" => Ok(Self::Team),
            "project" => Ok(Self::Project),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(GovernorError::NotFound(format!("Package {package} not found"))),
        }
    }

    /// Canonical lower-case package name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Developer => "developer",
            Self::Team => "team",
            Self::Project => "project",
            Self::Enterprise => "enterprise",
        }
    }

    /// Limits granted to every workspace of an account on this tier.
    #[must_use]
    pub const fn limits(self) -> TierLimits {
        const BUILDER_EXECUTION_TIME: Duration = Duration::from_secs(10 * 60);
        match self {
            Self::Developer | Self::Team => TierLimits {
                runner_lifetime: RunnerLifetime::Limited(Duration::from_secs(60 * 60)),
                builder_execution_time: BUILDER_EXECUTION_TIME,
            },
            Self::Project | Self::Enterprise => TierLimits {
                runner_lifetime: RunnerLifetime::Unlimited,
                builder_execution_time: BUILDER_EXECUTION_TIME,
            },
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long a runner may live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerLifetime {
    /// Stopped after the given duration.
    Limited(Duration),
    /// Never stopped by the platform.
    Unlimited,
}

impl RunnerLifetime {
    /// Attribute value in seconds, `-1` for unlimited.
    #[must_use]
    pub fn to_attribute(self) -> String {
        match self {
            Self::Limited(duration) => duration.as_secs().to_string(),
            Self::Unlimited => UNLIMITED.to_owned(),
        }
    }
}

/// Per-workspace limits derived from a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    /// Runner lifetime.
    pub runner_lifetime: RunnerLifetime,
    /// Maximum builder execution time.
    pub builder_execution_time: Duration,
}

impl TierLimits {
    /// Builder execution time attribute value in seconds.
    #[must_use]
    pub fn builder_execution_time_attribute(&self) -> String {
        self.builder_execution_time.as_secs().to_string()
    }
}
