//! Lifecycle transitions and their outcomes.

use std::fmt;

use crate::{
    model::Subscription,
    policy::{ApplyReport, RevertReport},
};

/// A subscription state transition reported by the orchestrator.
#[derive(Debug, Clone, Copy)]
pub enum LifecycleEvent<'a> {
    /// A subscription is about to be created; nothing has been persisted yet.
    BeforeCreate(&'a Subscription),
    /// A subscription was created.
    AfterCreate(&'a Subscription),
    /// Periodic re-check of an existing subscription.
    Check(&'a Subscription),
    /// A subscription was updated.
    Update {
        /// Snapshot before the update.
        old: &'a Subscription,
        /// Snapshot after the update.
        new: &'a Subscription,
    },
    /// A subscription was removed.
    Remove(&'a Subscription),
}

impl<'a> LifecycleEvent<'a> {
    /// Returns the snapshot the policy acts on.
    #[must_use]
    pub fn subscription(&self) -> &'a Subscription {
        match *self {
            Self::BeforeCreate(sub)
            | Self::AfterCreate(sub)
            | Self::Check(sub)
            | Self::Remove(sub) => sub,
            Self::Update { new, .. } => new,
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BeforeCreate(_) => "before_create",
            Self::AfterCreate(_) => "after_create",
            Self::Check(_) => "check",
            Self::Update { .. } => "update",
            Self::Remove(_) => "remove",
        }
    }
}

impl fmt::Display for LifecycleEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Successful result of a dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// Pre-create validation passed.
    Validated,
    /// Quota attributes were written.
    Applied(ApplyReport),
    /// Quota attributes were removed, possibly with per-workspace failures.
    Reverted(RevertReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_acts_on_new_snapshot() {
        let old = Subscription::new("sub-1", "acc-1", "Saas").with_property("Package", "team");
        let new = Subscription::new("sub-1", "acc-1", "Saas").with_property("Package", "project");
        let event = LifecycleEvent::Update { old: &old, new: &new };

        assert_eq!(event.subscription().package(), Some("project"));
        assert_eq!(event.to_string(), "update");
    }

    #[test]
    fn test_event_names() {
        let sub = Subscription::new("sub-1", "acc-1", "Saas");
        assert_eq!(LifecycleEvent::BeforeCreate(&sub).name(), "before_create");
        assert_eq!(LifecycleEvent::AfterCreate(&sub).name(), "after_create");
        assert_eq!(LifecycleEvent::Check(&sub).name(), "check");
        assert_eq!(LifecycleEvent::Remove(&sub).name(), "remove");
    }
}
