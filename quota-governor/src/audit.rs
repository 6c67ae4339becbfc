//! Audit trail for quota changes.
//!
//! Every pass that touches workspace attributes, and every rejected creation, is
//! recorded as a structured [`AuditEvent`] on the `audit` tracing target. Events of one
//! pass share a `pass_id` so that per-workspace failures can be correlated with the
//! pass that produced them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::model::{AccountId, Subscription, SubscriptionId, WorkspaceId};

/// Types of auditable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Pre-create validation refused the subscription.
    CreateRejected,
    /// Quota attributes were written after creation or a periodic check.
    QuotaApplied,
    /// Quota attributes were rewritten after a subscription update.
    QuotaUpdated,
    /// Quota attributes were removed after the subscription was removed.
    QuotaReverted,
    /// One workspace could not be reverted; the pass continued.
    WorkspaceRevertFailed,
}

/// Contextual details of an audit event.
///
/// Fields that do not apply to an event are left out of the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditDetails {
    /// Package before an update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_package: Option<String>,
    /// Package in effect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// RAM property before an update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_ram: Option<String>,
    /// RAM property in effect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    /// Workspace the event concerns, or the one holding the RAM allocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<WorkspaceId>,
    /// Number of workspaces written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_count: Option<usize>,
    /// Error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Duration of the pass in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Audit log entry.
///
/// # Examples
///
/// ```
/// use quota_governor::{
///     audit::{AuditEvent, AuditEventType, audit_log},
///     model::Subscription,
/// };
/// use uuid::Uuid;
///
/// let sub = Subscription::new("sub-1", "acc-1", "Saas").with_property("Package", "team");
/// let event = AuditEvent::for_subscription(AuditEventType::QuotaApplied, &sub, Uuid::new_v4())
///     .with_workspace_count(3);
///
/// audit_log(&event);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub event_type: AuditEventType,
    /// Account whose workspaces were affected.
    pub account_id: AccountId,
    /// Subscription that triggered the event.
    pub subscription_id: SubscriptionId,
    /// Correlation id shared by all events of one pass.
    pub pass_id: Uuid,
    /// Event details.
    pub details: AuditDetails,
}

impl AuditEvent {
    /// Creates an event for a subscription, recording its package and RAM properties.
    #[must_use]
    pub fn for_subscription(
        event_type: AuditEventType,
        subscription: &Subscription,
        pass_id: Uuid,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            account_id: subscription.account_id.clone(),
            subscription_id: subscription.id.clone(),
            pass_id,
            details: AuditDetails {
                package: subscription.package().map(str::to_owned),
                ram: subscription.ram().map(str::to_owned),
                ..AuditDetails::default()
            },
        }
    }

    /// Records the package and RAM of the snapshot an update replaced.
    #[must_use]
    pub fn with_previous(mut self, previous: &Subscription) -> Self {
        self.details.previous_package = previous.package().map(str::to_owned);
        self.details.previous_ram = previous.ram().map(str::to_owned);
        self
    }

    /// Adds the workspace the event concerns.
    #[must_use]
    pub fn with_workspace(mut self, workspace_id: &WorkspaceId) -> Self {
        self.details.workspace_id = Some(workspace_id.clone());
        self
    }

    /// Adds the number of workspaces written.
    #[must_use]
    pub fn with_workspace_count(mut self, count: usize) -> Self {
        self.details.workspace_count = Some(count);
        self
    }

    /// Adds an error message.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.details.error = Some(error.into());
        self
    }

    /// Adds the pass duration.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "duration in ms fits u64 for practical values"
    )]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.details.duration_ms = Some(duration.as_millis() as u64);
        self
    }
}

/// Logs an audit event to tracing with target "audit".
///
/// Details are emitted as a JSON object so that log pipelines can index them.
pub fn audit_log(event: &AuditEvent) {
    let details = serde_json::to_string(&event.details).unwrap_or_default();
    tracing::info!(
        target: "audit",
        timestamp = %event.timestamp.to_rfc3339(),
        event_type = ?event.event_type,
        account_id = %event.account_id,
        subscription_id = %event.subscription_id,
        pass_id = %event.pass_id,
        details = %details,
        "AUDIT"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription() -> Subscription {
        Subscription::new("sub-1", "acc-1", "Saas")
            .with_property("Package", "Team")
            .with_property("RAM", "2GB")
    }

    #[test]
    fn test_event_copies_subscription_properties() {
        let pass_id = Uuid::new_v4();
        let event =
            AuditEvent::for_subscription(AuditEventType::QuotaApplied, &subscription(), pass_id);

        assert_eq!(event.pass_id, pass_id);
        assert_eq!(event.account_id, AccountId::new("acc-1"));
        assert_eq!(event.details.package.as_deref(), Some("Team"));
        assert_eq!(event.details.ram.as_deref(), Some("2GB"));
        assert!(event.details.previous_package.is_none());
    }

    #[test]
    fn test_event_with_previous_snapshot() {
        let previous = Subscription::new("sub-1", "acc-1", "Saas")
            .with_property("Package", "Developer")
            .with_property("RAM", "1GB");
        let event =
            AuditEvent::for_subscription(
                AuditEventType::QuotaUpdated,
                &subscription(),
                Uuid::new_v4(),
            )
                .with_previous(&previous);

        assert_eq!(event.details.previous_package.as_deref(), Some("Developer"));
        assert_eq!(event.details.previous_ram.as_deref(), Some("1GB"));
        assert_eq!(event.details.package.as_deref(), Some("Team"));
    }

    #[test]
    fn test_event_builder() {
        let event = AuditEvent::for_subscription(
            AuditEventType::WorkspaceRevertFailed,
            &subscription(),
            Uuid::new_v4(),
        )
        .with_workspace(&WorkspaceId::new("ws-2"))
        .with_error("Server error: disk full")
        .with_duration(Duration::from_millis(42));

        assert_eq!(event.details.workspace_id, Some(WorkspaceId::new("ws-2")));
        assert_eq!(event.details.error.as_deref(), Some("Server error: disk full"));
        assert_eq!(event.details.duration_ms, Some(42));
    }

    #[test]
    fn test_event_serialization_skips_empty_details() {
        let event = AuditEvent::for_subscription(
            AuditEventType::QuotaReverted,
            &Subscription::new("sub-9", "acc-9", "Saas"),
            Uuid::new_v4(),
        )
        .with_workspace_count(2);

        let json = serde_json::to_string(&event).expect("should serialize");
        assert!(json.contains("quota_reverted"));
        assert!(json.contains("\"workspace_count\":2"));
        assert!(!json.contains("previous_package"));
        assert!(!json.contains("\"error\""));
    }
}
