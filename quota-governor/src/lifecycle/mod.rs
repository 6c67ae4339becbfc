//! Lifecycle dispatch: the hook surface and the governor implementing it.

pub mod event;
pub mod governor;
pub mod hooks;

pub use event::{LifecycleEvent, LifecycleOutcome};
pub use governor::QuotaGovernor;
pub use hooks::SubscriptionLifecycle;
