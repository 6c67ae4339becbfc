//! Names of the workspace attributes the governor owns.

use crate::config::DEFAULT_ATTRIBUTE_PREFIX;

const RUNNER_LIFETIME: &str = "runner_lifetime";
const BUILDER_EXECUTION_TIME: &str = "builder_execution_time";
const RUNNER_RAM: &str = "runner_ram";

/// Fully qualified keys of the three quota attributes.
///
/// No other workspace attribute is read or written by the governor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeKeys {
    /// Runner lifetime in seconds, `-1` for unlimited.
    pub runner_lifetime: String,
    /// Builder execution time in seconds.
    pub builder_execution_time: String,
    /// Runner RAM in megabytes.
    pub runner_ram: String,
}

impl AttributeKeys {
    /// Builds the keys under the given namespace prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use quota_governor::policy::AttributeKeys;
    ///
    /// let keys = AttributeKeys::with_prefix("acme:");
    /// assert_eq!(keys.runner_ram, "acme:runner_ram");
    /// ```
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            runner_lifetime: format!("{prefix}{RUNNER_LIFETIME}"),
            builder_execution_time: format!("{prefix}{BUILDER_EXECUTION_TIME}"),
            runner_ram: format!("{prefix}{RUNNER_RAM}"),
        }
    }
}

impl Default for AttributeKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_ATTRIBUTE_PREFIX)
    }
}
