//! Governor configuration.
//!
//! This module defines the TOML-deserializable settings of a governor instance.
//!
//! ```toml
//! service_id = "Saas"
//! attribute_prefix = "codenvy:"
//! allocation_order = "workspace_id"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::{
    error::{GovernorError, Result},
    model::ServiceId,
};

/// Service id governed when none is configured.
pub const DEFAULT_SERVICE_ID: &str = "Saas";

/// Attribute namespace used when none is configured.
pub const DEFAULT_ATTRIBUTE_PREFIX: &str = "codenvy:";

/// Order in which an account's workspaces are processed within one pass.
///
/// The first workspace processed holds the account's RAM allocation, so this setting
/// decides which workspace wins it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationOrder {
    /// Keep the order returned by the workspace store.
    ///
    /// Stores are not required to return a stable order, so the winner can change
    /// between passes.
    #[default]
    Enumeration,
    /// Sort by workspace id as a string, lexicographically lowest first.
    ///
    /// Ids are not compared numerically: `ws-10` sorts before `ws-2`.
    WorkspaceId,
}

/// Root governor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GovernorConfig {
    /// Service whose subscriptions this governor handles.
    #[serde(default = "default_service_id")]
    pub service_id: String,

    /// Prefix of the three quota attribute keys.
    #[serde(default = "default_attribute_prefix")]
    pub attribute_prefix: String,

    /// Workspace processing order.
    #[serde(default)]
    pub allocation_order: AllocationOrder,
}

fn default_service_id() -> String {
    DEFAULT_SERVICE_ID.to_owned()
}

fn default_attribute_prefix() -> String {
    DEFAULT_ATTRIBUTE_PREFIX.to_owned()
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            service_id: default_service_id(),
            attribute_prefix: default_attribute_prefix(),
            allocation_order: AllocationOrder::default(),
        }
    }
}

impl GovernorConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns `GovernorError::ConfigError` if TOML parsing or validation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use quota_governor::config::{AllocationOrder, GovernorConfig};
    ///
    /// let config = GovernorConfig::from_toml(r#"allocation_order = "workspace_id""#).unwrap();
    /// assert_eq!(config.service_id, "Saas");
    /// assert_eq!(config.allocation_order, AllocationOrder::WorkspaceId);
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| GovernorError::ConfigError(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or the configuration is invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GovernorError::ConfigError(format!("cannot read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Validates the configuration.
    ///
    /// This method checks that:
    /// - the service id is not blank
    /// - the attribute prefix contains no whitespace
    ///
    /// # Errors
    ///
    /// Returns `GovernorError::ConfigError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.service_id.trim().is_empty() {
            return Err(GovernorError::ConfigError("service_id cannot be empty".into()));
        }
        if self.attribute_prefix.chars().any(char::is_whitespace) {
            return Err(GovernorError::ConfigError(format!(
                "attribute_prefix must not contain whitespace: '{}'",
                self.attribute_prefix
            )));
        }
        Ok(())
    }

    /// Returns the governed service id.
    #[must_use]
    pub fn service_id(&self) -> ServiceId {
        ServiceId::new(self.service_id.as_str())
    }
}
