//! Quota policy engine.
//!
//! Installs and removes the per-workspace quota attributes of an account.
//!
//! # Single-allocation rule
//!
//! RAM is an account-level budget. Within one pass the first workspace processed
//! receives the subscription's whole RAM size and every other workspace is pinned to
//! `0`. Reverting mirrors this: the first workspace drops the attribute, falling back
//! to the platform default, and every other workspace keeps `0`.
//!
//! The engine holds no lock. Two passes over the same account running concurrently
//! can interleave their writes and leave more than one workspace with RAM; callers
//! that need the invariant under concurrency must serialize hooks per account.

use std::sync::Arc;

use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::{
    AttributeKeys, Tier,
    report::{ApplyReport, RevertFailure, RevertReport},
    units::to_megabytes,
};
use crate::{
    audit::{AuditEvent, AuditEventType, audit_log},
    config::{AllocationOrder, GovernorConfig},
    error::{GovernorError, Result},
    model::{AccountId, PACKAGE_PROPERTY, RAM_PROPERTY, Subscription, Workspace},
    store::WorkspaceStore,
};

pub(crate) const PROPERTIES_REQUIRED: &str = "Subscription properties required";
pub(crate) const NO_WORKSPACES: &str = "Given account doesn't have any workspaces.";

/// Returns a required subscription property.
pub(crate) fn required_property<'a>(subscription: &'a Subscription, name: &str) -> Result<&'a str> {
    subscription
        .property(name)
        .ok_or_else(|| GovernorError::Conflict(format!("Subscription property '{name}' required")))
}

/// Computes and writes quota attributes for an account's workspaces.
pub struct QuotaPolicy {
    workspaces: Arc<dyn WorkspaceStore>,
    keys: AttributeKeys,
    order: AllocationOrder,
}

impl std::fmt::Debug for QuotaPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaPolicy")
            .field("keys", &self.keys)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl QuotaPolicy {
    /// Creates an engine writing through the given store.
    #[must_use]
    pub fn new(workspaces: Arc<dyn WorkspaceStore>, config: &GovernorConfig) -> Self {
        Self {
            workspaces,
            keys: AttributeKeys::with_prefix(&config.attribute_prefix),
            order: config.allocation_order,
        }
    }

    /// Returns the attribute keys this engine writes.
    #[must_use]
    pub fn keys(&self) -> &AttributeKeys {
        &self.keys
    }

    /// Lists the account's workspaces in processing order.
    pub(crate) fn load_workspaces(&self, account_id: &AccountId) -> Result<Vec<Workspace>> {
        let mut workspaces = self.workspaces.list_by_account(account_id)?;
        if self.order == AllocationOrder::WorkspaceId {
            workspaces.sort_by(|a, b| a.id.cmp(&b.id));
        }
        Ok(workspaces)
    }

    /// Writes the subscription's quota attributes to every workspace of its account.
    ///
    /// Every workspace gets the tier's runner lifetime and builder execution time. The
    /// first workspace processed gets the subscription's RAM in megabytes, all others
    /// get `0`.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the subscription has no properties, lacks `Package` or `RAM`,
    ///   has a malformed `RAM`, or the account has no workspaces
    /// - `NotFound` if `Package` is not a known tier
    /// - any error returned by the workspace store; the pass stops at the failing
    ///   workspace and earlier writes are kept
    #[instrument(
        skip(self, subscription),
        fields(account_id = %subscription.account_id, subscription_id = %subscription.id)
    )]
    pub fn apply(&self, subscription: &Subscription) -> Result<ApplyReport> {
        let pass_id = Uuid::new_v4();
        if subscription.properties.is_none() {
            return Err(GovernorError::Conflict(PROPERTIES_REQUIRED.into()));
        }
        let workspaces = self.load_workspaces(&subscription.account_id)?;
        let Some(allocated_to) = workspaces.first().map(|workspace| workspace.id.clone()) else {
            return Err(GovernorError::Conflict(NO_WORKSPACES.into()));
        };

        let tier = Tier::lookup(required_property(subscription, PACKAGE_PROPERTY)?)?;
        let ram_megabytes = to_megabytes(required_property(subscription, RAM_PROPERTY)?)?;
        let limits = tier.limits();
        let runner_lifetime = limits.runner_lifetime.to_attribute();
        let builder_execution_time = limits.builder_execution_time_attribute();

        let mut ram_allocated = false;
        let mut workspaces_updated = Vec::with_capacity(workspaces.len());
        for mut workspace in workspaces {
            let runner_ram = if ram_allocated { 0 } else { ram_megabytes };
            ram_allocated = true;

            let attributes = &mut workspace.attributes;
            attributes.insert(self.keys.runner_lifetime.clone(), runner_lifetime.clone());
            attributes
                .insert(self.keys.builder_execution_time.clone(), builder_execution_time.clone());
            attributes.insert(self.keys.runner_ram.clone(), runner_ram.to_string());

            self.workspaces.update(&workspace)?;
            debug!(workspace_id = %workspace.id, runner_ram, "Quota attributes written");
            workspaces_updated.push(workspace.id);
        }

        info!(
            tier = %tier,
            ram_megabytes,
            allocated_to = %allocated_to,
            workspaces = workspaces_updated.len(),
            "Quota applied"
        );
        Ok(ApplyReport { pass_id, tier, ram_megabytes, allocated_to, workspaces_updated })
    }

    /// Removes the quota attributes from every workspace of the subscription's account.
    ///
    /// Runner lifetime and builder execution time are removed everywhere. The first
    /// workspace processed loses its RAM attribute; all others are set to `0`. A
    /// workspace whose write fails is logged, audited, recorded in the report and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only if the account's workspaces cannot be listed.
    #[instrument(
        skip(self, subscription),
        fields(account_id = %subscription.account_id, subscription_id = %subscription.id)
    )]
    pub fn revert(&self, subscription: &Subscription) -> Result<RevertReport> {
        let mut report = RevertReport::new(Uuid::new_v4());
        let mut default_ram_restored = false;

        for mut workspace in self.load_workspaces(&subscription.account_id)? {
            let attributes = &mut workspace.attributes;
            if default_ram_restored {
                attributes.insert(self.keys.runner_ram.clone(), "0".to_owned());
            } else {
                attributes.remove(&self.keys.runner_ram);
                default_ram_restored = true;
            }
            attributes.remove(&self.keys.runner_lifetime);
            attributes.remove(&self.keys.builder_execution_time);

            match self.workspaces.update(&workspace) {
                Ok(()) => {
                    debug!(workspace_id = %workspace.id, "Quota attributes removed");
                    report.reverted.push(workspace.id);
                }
                Err(error) => {
                    error!(
                        workspace_id = %workspace.id,
                        error = %error,
                        "Failed to revert workspace quota"
                    );
                    audit_log(
                        &AuditEvent::for_subscription(
                            AuditEventType::WorkspaceRevertFailed,
                            subscription,
                            report.pass_id,
                        )
                        .with_workspace(&workspace.id)
                        .with_error(error.to_string()),
                    );
                    report.failures.push(RevertFailure { workspace_id: workspace.id, error });
                }
            }
        }

        info!(
            reverted = report.reverted.len(),
            failed = report.failures.len(),
            "Quota reverted"
        );
        Ok(report)
    }
}
