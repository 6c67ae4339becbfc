//! Quota Governor: workspace resource quotas driven by subscription lifecycle events.
//!
//! A paid workspace service registers a [`SubscriptionLifecycle`] with the subscription
//! orchestrator. The [`QuotaGovernor`] reacts to each transition of a subscription by
//! writing, refreshing or removing three quota attributes on every workspace the
//! subscriber's account owns.
//!
//! # What does it govern?
//!
//! - **Runner lifetime**: how long a runner may live, derived from the subscription tier
//! - **Builder execution time**: how long a build may run, derived from the tier
//! - **Runner RAM**: the account's RAM budget, given whole to a single workspace
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │ Subscription orchestrator │  create / check / update / remove
//! └────────────┬─────────────┘
//!              │ LifecycleEvent
//! ┌────────────▼─────────────────────────────────┐
//! │            QuotaGovernor (this crate)         │
//! │  ┌──────────────────┐   ┌──────────────────┐  │
//! │  │ validate_before_ │   │   QuotaPolicy    │  │
//! │  │ create           │   │ (tier + RAM →    │  │
//! │  │                  │   │  attributes)     │  │
//! │  └────────┬─────────┘   └────────┬─────────┘  │
//! └───────────┼──────────────────────┼────────────┘
//!             │                      │
//! ┌───────────▼─────────┐  ┌─────────▼──────────┐
//! │ SubscriptionStore   │  │  WorkspaceStore    │
//! └─────────────────────┘  └────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use quota_governor::{
//!     LifecycleEvent, LifecycleOutcome, QuotaGovernor, SubscriptionLifecycle,
//!     model::{Subscription, Workspace},
//!     store::{InMemorySubscriptionStore, InMemoryWorkspaceStore, WorkspaceStore},
//! };
//!
//! # fn example() -> quota_governor::Result<()> {
//! let workspaces = Arc::new(InMemoryWorkspaceStore::with_workspaces(vec![
//!     Workspace::new("ws-1", "acc-1"),
//!     Workspace::new("ws-2", "acc-1"),
//! ]));
//! let governor = QuotaGovernor::new(workspaces.clone(), Arc::new(InMemorySubscriptionStore::new()));
//!
//! let sub = Subscription::new("sub-1", "acc-1", "Saas")
//!     .with_property("Package", "Enterprise")
//!     .with_property("RAM", "4GB");
//!
//! governor.dispatch(LifecycleEvent::BeforeCreate(&sub))?;
//! let outcome = governor.dispatch(LifecycleEvent::AfterCreate(&sub))?;
//! assert!(matches!(outcome, LifecycleOutcome::Applied(_)));
//!
//! let listed = workspaces.list_by_account(&sub.account_id)?;
//! assert_eq!(listed[0].attribute("codenvy:runner_ram"), Some("4096"));
//! assert_eq!(listed[1].attribute("codenvy:runner_ram"), Some("0"));
//! assert_eq!(listed[1].attribute("codenvy:runner_lifetime"), Some("-1"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Error Handling
//!
//! All hooks return [`Result<T>`](error::Result) with [`GovernorError`]:
//!
//! - `Conflict`: the subscription or account state forbids the transition
//! - `NotFound`: the `Package` property names no known tier
//! - `ServerError`: a collaborator failed
//!
//! Removal never fails on a single workspace; failures are collected in the
//! [`RevertReport`](policy::RevertReport) instead.
//!
//! # Observability
//!
//! Every hook emits `tracing` spans and events. Audit records go to the `audit`
//! target. With the `observability` feature, [`observability::init_observability`]
//! installs a pretty or JSON subscriber.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod audit;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
#[cfg(feature = "observability")]
pub mod observability;
pub mod policy;
pub mod store;

pub use config::{AllocationOrder, GovernorConfig};
pub use error::{GovernorError, Result};
pub use lifecycle::{LifecycleEvent, LifecycleOutcome, QuotaGovernor, SubscriptionLifecycle};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _ = std::marker::PhantomData::<GovernorError>;
        let _ = std::marker::PhantomData::<QuotaGovernor>;
        assert_eq!(GovernorConfig::default().allocation_order, AllocationOrder::Enumeration);
    }
}
