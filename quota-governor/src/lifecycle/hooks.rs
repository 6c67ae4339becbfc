//! Lifecycle hook surface invoked by the subscription orchestrator.

use tracing::debug;

use super::{LifecycleEvent, LifecycleOutcome};
use crate::{
    error::Result,
    model::{ServiceId, Subscription},
    policy::{ApplyReport, RevertReport},
};

/// Hooks a service registers to react to its subscriptions' state transitions.
///
/// The orchestrator calls [`dispatch`](Self::dispatch), or the individual hooks, for
/// every transition of a subscription whose service id equals
/// [`service_id`](Self::service_id). Each hook runs to completion before returning.
pub trait SubscriptionLifecycle: Send + Sync {
    /// Service this implementation handles.
    fn service_id(&self) -> &ServiceId;

    /// Checks that the subscription may be created.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a precondition fails, `ServerError` on collaborator failure.
    fn validate_before_create(&self, subscription: &Subscription) -> Result<()>;

    /// Installs quotas for a newly created subscription.
    ///
    /// # Errors
    ///
    /// Returns `Conflict`, `NotFound` or a collaborator error.
    fn apply_after_create(&self, subscription: &Subscription) -> Result<ApplyReport>;

    /// Recomputes quotas on a periodic check.
    ///
    /// # Errors
    ///
    /// Returns `Conflict`, `NotFound` or a collaborator error.
    fn reapply(&self, subscription: &Subscription) -> Result<ApplyReport>;

    /// Recomputes quotas after an update. Only `new` drives the result.
    ///
    /// # Errors
    ///
    /// Returns `Conflict`, `NotFound` or a collaborator error.
    fn apply_after_update(&self, old: &Subscription, new: &Subscription) -> Result<ApplyReport>;

    /// Removes quotas after the subscription was removed.
    ///
    /// Per-workspace failures are returned in the report, never as an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the account's workspaces cannot be listed.
    fn revert_on_remove(&self, subscription: &Subscription) -> Result<RevertReport>;

    /// Routes an event to its hook.
    ///
    /// # Errors
    ///
    /// Returns the error of the hook the event was routed to.
    fn dispatch(&self, event: LifecycleEvent<'_>) -> Result<LifecycleOutcome> {
        debug!(
            event = %event,
            service_id = %self.service_id(),
            subscription_id = %event.subscription().id,
            "Dispatching lifecycle event"
        );
        match event {
            LifecycleEvent::BeforeCreate(sub) => {
                self.validate_before_create(sub).map(|()| LifecycleOutcome::Validated)
            }
            LifecycleEvent::AfterCreate(sub) => {
                self.apply_after_create(sub).map(LifecycleOutcome::Applied)
            }
            LifecycleEvent::Check(sub) => self.reapply(sub).map(LifecycleOutcome::Applied),
            LifecycleEvent::Update { old, new } => {
                self.apply_after_update(old, new).map(LifecycleOutcome::Applied)
            }
            LifecycleEvent::Remove(sub) => {
                self.revert_on_remove(sub).map(LifecycleOutcome::Reverted)
            }
        }
    }
}
