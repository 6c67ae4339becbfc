//! Error types for the quota governor.
//!
//! Every lifecycle hook and every collaborator call returns [`Result`], carrying one of
//! the [`GovernorError`] kinds. All errors implement [`std::error::Error`] via
//! [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Precondition errors** ([`GovernorError::Conflict`]): the subscription or account
//!   state does not allow the transition
//! - **Lookup errors** ([`GovernorError::NotFound`]): an unknown tier, or a record the
//!   store could not find
//! - **Collaborator errors** ([`GovernorError::ServerError`]): persistence failures
//! - **Configuration errors** ([`GovernorError::ConfigError`]): invalid governor settings
//!
//! # Examples
//!
//! ```
//! use quota_governor::error::{GovernorError, Result};
//!
//! fn require_package(package: Option<&str>) -> Result<&str> {
//!     package.ok_or_else(|| GovernorError::Conflict("Subscription property Package required".into()))
//! }
//!
//! assert!(require_package(None).is_err());
//! ```

use thiserror::Error;

/// Message reported when an account already holds a subscription for the service.
pub const SUBSCRIPTION_LIMIT_EXHAUSTED: &str =
    "Impossible to add a new subscription: the account already has a subscription for this service";

/// Result type alias for governor operations.
pub type Result<T> = std::result::Result<T, GovernorError>;

/// Errors that can occur while governing subscription quotas.
///
/// The first three variants are the kinds a lifecycle hook surfaces to its caller.
/// Collaborator implementations report their own failures with the same kinds.
///
/// # Error Recovery
///
/// - [`Conflict`](Self::Conflict): fix the subscription or account state; never retried
/// - [`NotFound`](Self::NotFound): the package name is not a known tier, or a workspace
///   disappeared between enumeration and update
/// - [`ServerError`](Self::ServerError): transient persistence failure; the orchestrator
///   may retry the whole hook
/// - [`ConfigError`](Self::ConfigError): fix the governor configuration
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GovernorError {
    /// A precondition of the lifecycle transition was violated.
    ///
    /// Raised for missing subscription properties, a duplicate subscription, an account
    /// without workspaces, or a malformed RAM value.
    ///
    /// # Examples
    ///
    /// ```
    /// use quota_governor::error::GovernorError;
    ///
    /// let err = GovernorError::Conflict("Subscription properties required".to_string());
    /// assert_eq!(err.to_string(), "Conflict: Subscription properties required");
    /// ```
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced entity does not exist.
    ///
    /// The governor raises this for a `Package` value outside the tier table.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A collaborator failed to read or persist data.
    #[error("Server error: {0}")]
    ServerError(String),

    /// The governor configuration is invalid.
    #[error("Invalid governor configuration: {0}")]
    ConfigError(String),
}

impl GovernorError {
    /// Returns the kind name used in logs and audit records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Conflict(_) => "conflict",
            Self::NotFound(_) => "not_found",
            Self::ServerError(_) => "server_error",
            Self::ConfigError(_) => "config_error",
        }
    }

    /// Returns the message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Conflict(msg)
            | Self::NotFound(msg)
            | Self::ServerError(msg)
            | Self::ConfigError(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_display() {
        let error = GovernorError::Conflict("Given account doesn't have any workspaces.".into());
        assert_eq!(error.to_string(), "Conflict: Given account doesn't have any workspaces.");
    }

    #[test]
    fn test_not_found_display() {
        let error = GovernorError::NotFound("Package gold not found".into());
        assert!(error.to_string().contains("Package gold not found"));
    }

    #[test]
    fn test_server_error_display() {
        let error = GovernorError::ServerError("connection reset".to_owned());
        assert_eq!(error.to_string(), "Server error: connection reset");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(GovernorError::Conflict(String::new()).kind(), "conflict");
        assert_eq!(GovernorError::NotFound(String::new()).kind(), "not_found");
        assert_eq!(GovernorError::ServerError(String::new()).kind(), "server_error");
        assert_eq!(GovernorError::ConfigError(String::new()).kind(), "config_error");
    }

    #[test]
    fn test_error_message_strips_kind() {
        let error = GovernorError::ServerError("connection reset".into());
        assert_eq!(error.message(), "connection reset");
    }
}
