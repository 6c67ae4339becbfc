//! The quota governor: lifecycle hooks of the paid workspace service.

use std::{sync::Arc, time::Instant};

use tracing::{error, instrument, warn};
use uuid::Uuid;

use super::SubscriptionLifecycle;
use crate::{
    audit::{AuditEvent, AuditEventType, audit_log},
    config::GovernorConfig,
    error::{GovernorError, Result, SUBSCRIPTION_LIMIT_EXHAUSTED},
    model::{PACKAGE_PROPERTY, RAM_PROPERTY, ServiceId, Subscription},
    policy::{
        ApplyReport, QuotaPolicy, RevertReport,
        engine::{NO_WORKSPACES, PROPERTIES_REQUIRED, required_property},
    },
    store::{SubscriptionStore, WorkspaceStore},
};

/// Governs workspace quotas for one service's subscriptions.
///
/// Stateless apart from shared handles to its two collaborators; one instance can
/// serve any number of accounts and threads. Hooks for the same account are not
/// serialized, see [`QuotaPolicy`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use quota_governor::{
///     QuotaGovernor, SubscriptionLifecycle,
///     model::{Subscription, Workspace},
///     store::{InMemorySubscriptionStore, InMemoryWorkspaceStore},
/// };
///
/// # fn example() -> quota_governor::Result<()> {
/// let workspaces = Arc::new(InMemoryWorkspaceStore::with_workspaces(vec![
///     Workspace::new("ws-1", "acc-1"),
///     Workspace::new("ws-2", "acc-1"),
/// ]));
/// let governor = QuotaGovernor::new(workspaces, Arc::new(InMemorySubscriptionStore::new()));
///
/// let sub = Subscription::new("sub-1", "acc-1", "Saas")
///     .with_property("Package", "Team")
///     .with_property("RAM", "2GB");
///
/// governor.validate_before_create(&sub)?;
/// let report = governor.apply_after_create(&sub)?;
/// assert_eq!(report.ram_megabytes, 2048);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct QuotaGovernor {
    service_id: ServiceId,
    subscriptions: Arc<dyn SubscriptionStore>,
    policy: QuotaPolicy,
}

impl std::fmt::Debug for QuotaGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaGovernor")
            .field("service_id", &self.service_id)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl QuotaGovernor {
    /// Creates a governor with the default configuration.
    #[must_use]
    pub fn new(
        workspaces: Arc<dyn WorkspaceStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
    ) -> Self {
        Self::build(workspaces, subscriptions, &GovernorConfig::default())
    }

    /// Creates a governor from a configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration does not validate.
    pub fn with_config(
        workspaces: Arc<dyn WorkspaceStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        config: &GovernorConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(workspaces, subscriptions, config))
    }

    fn build(
        workspaces: Arc<dyn WorkspaceStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        config: &GovernorConfig,
    ) -> Self {
        Self {
            service_id: config.service_id(),
            subscriptions,
            policy: QuotaPolicy::new(workspaces, config),
        }
    }

    /// Returns the policy engine.
    #[must_use]
    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    fn check_create(&self, subscription: &Subscription) -> Result<()> {
        if subscription.properties.is_none() {
            return Err(GovernorError::Conflict(PROPERTIES_REQUIRED.into()));
        }
        required_property(subscription, PACKAGE_PROPERTY)?;
        required_property(subscription, RAM_PROPERTY)?;

        let existing = self
            .subscriptions
            .list_subscriptions(&subscription.account_id, &self.service_id)
            .map_err(|e| {
                error!(error = %e, "Failed to list existing subscriptions");
                GovernorError::ServerError(e.message().to_owned())
            })?;
        if !existing.is_empty() {
            return Err(GovernorError::Conflict(SUBSCRIPTION_LIMIT_EXHAUSTED.into()));
        }

        if self.policy.load_workspaces(&subscription.account_id)?.is_empty() {
            return Err(GovernorError::Conflict(NO_WORKSPACES.into()));
        }
        Ok(())
    }

    fn apply_and_audit(
        &self,
        subscription: &Subscription,
        previous: Option<&Subscription>,
    ) -> Result<ApplyReport> {
        let started = Instant::now();
        let report = self.policy.apply(subscription)?;

        let event_type = if previous.is_some() {
            AuditEventType::QuotaUpdated
        } else {
            AuditEventType::QuotaApplied
        };
        let event = AuditEvent::for_subscription(event_type, subscription, report.pass_id)
            .with_workspace(&report.allocated_to)
            .with_workspace_count(report.workspaces_updated.len())
            .with_duration(started.elapsed());
        let event = match previous {
            Some(old) => event.with_previous(old),
            None => event,
        };
        audit_log(&event);
        Ok(report)
    }
}

impl SubscriptionLifecycle for QuotaGovernor {
    fn service_id(&self) -> &ServiceId {
        &self.service_id
    }

    #[instrument(
        skip(self, subscription),
        fields(account_id = %subscription.account_id, subscription_id = %subscription.id)
    )]
    fn validate_before_create(&self, subscription: &Subscription) -> Result<()> {
        self.check_create(subscription).inspect_err(|e| {
            warn!(kind = e.kind(), error = %e, "Subscription creation rejected");
            audit_log(
                &AuditEvent::for_subscription(
                    AuditEventType::CreateRejected,
                    subscription,
                    Uuid::new_v4(),
                )
                .with_error(e.to_string()),
            );
        })
    }

    fn apply_after_create(&self, subscription: &Subscription) -> Result<ApplyReport> {
        self.apply_and_audit(subscription, None)
    }

    fn reapply(&self, subscription: &Subscription) -> Result<ApplyReport> {
        self.apply_and_audit(subscription, None)
    }

    fn apply_after_update(&self, old: &Subscription, new: &Subscription) -> Result<ApplyReport> {
        self.apply_and_audit(new, Some(old))
    }

    fn revert_on_remove(&self, subscription: &Subscription) -> Result<RevertReport> {
        let started = Instant::now();
        let report = self.policy.revert(subscription)?;
        audit_log(
            &AuditEvent::for_subscription(
                AuditEventType::QuotaReverted,
                subscription,
                report.pass_id,
            )
            .with_workspace_count(report.reverted.len())
            .with_duration(started.elapsed()),
        );
        Ok(report)
    }
}
