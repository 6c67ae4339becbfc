//! Collaborator interfaces consumed by the governor.
//!
//! The governor owns no persistence. It reads subscriptions and workspaces and writes
//! workspaces back through these traits, which the embedding service implements on
//! top of its own DAO layer.
//!
//! # Implementation Notes
//!
//! - `list_by_account` must return the current full set for the account; the governor
//!   never caches it
//! - the returned order need not be stable between calls
//! - `update` replaces the stored attribute mapping with the one supplied
//! - errors use the [`GovernorError`](crate::error::GovernorError) kinds: `NotFound` for a
//!   missing record, `Conflict` for a rejected write, `ServerError` for anything else

pub mod memory;

pub use memory::{InMemorySubscriptionStore, InMemoryWorkspaceStore};

use crate::{
    error::Result,
    model::{AccountId, ServiceId, Subscription, Workspace},
};

/// Read/write access to an account's workspaces.
pub trait WorkspaceStore: Send + Sync {
    /// Returns every workspace owned by the account.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the backing store cannot be read.
    fn list_by_account(&self, account_id: &AccountId) -> Result<Vec<Workspace>>;

    /// Persists a workspace, replacing its attributes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the workspace no longer exists, `Conflict` if the store
    /// rejects the write, or `ServerError` on storage failure.
    fn update(&self, workspace: &Workspace) -> Result<()>;
}

/// Read access to existing subscriptions.
pub trait SubscriptionStore: Send + Sync {
    /// Returns the account's subscriptions for one service.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn list_subscriptions(
        &self,
        account_id: &AccountId,
        service_id: &ServiceId,
    ) -> Result<Vec<Subscription>>;
}
