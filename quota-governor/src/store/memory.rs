//! In-memory store implementations.
//!
//! Workspaces are enumerated in insertion order. Useful for embedding the governor in
//! tests or single-process tools.

use std::sync::RwLock;

use super::{SubscriptionStore, WorkspaceStore};
use crate::{
    error::{GovernorError, Result},
    model::{AccountId, ServiceId, Subscription, SubscriptionId, Workspace, WorkspaceId},
};

fn poisoned<T>(_: T) -> GovernorError {
    GovernorError::ServerError("in-memory store lock poisoned".into())
}

/// Workspace store backed by a vector.
#[derive(Debug, Default)]
pub struct InMemoryWorkspaceStore {
    workspaces: RwLock<Vec<Workspace>>,
}

impl InMemoryWorkspaceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given workspaces, in order.
    #[must_use]
    pub fn with_workspaces(workspaces: Vec<Workspace>) -> Self {
        Self { workspaces: RwLock::new(workspaces) }
    }

    /// Inserts a workspace, replacing any existing one with the same id in place.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the lock is poisoned.
    pub fn insert(&self, workspace: Workspace) -> Result<()> {
        let mut workspaces = self.workspaces.write().map_err(poisoned)?;
        match workspaces.iter_mut().find(|existing| existing.id == workspace.id) {
            Some(existing) => *existing = workspace,
            None => workspaces.push(workspace),
        }
        Ok(())
    }

    /// Returns a copy of one workspace.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the lock is poisoned.
    pub fn get(&self, id: &WorkspaceId) -> Result<Option<Workspace>> {
        let workspaces = self.workspaces.read().map_err(poisoned)?;
        Ok(workspaces.iter().find(|workspace| &workspace.id == id).cloned())
    }
}

impl WorkspaceStore for InMemoryWorkspaceStore {
    fn list_by_account(&self, account_id: &AccountId) -> Result<Vec<Workspace>> {
        let workspaces = self.workspaces.read().map_err(poisoned)?;
        Ok(workspaces
            .iter()
            .filter(|workspace| &workspace.account_id == account_id)
            .cloned()
            .collect())
    }

    fn update(&self, workspace: &Workspace) -> Result<()> {
        let mut workspaces = self.workspaces.write().map_err(poisoned)?;
        let existing = workspaces
            .iter_mut()
            .find(|existing| existing.id == workspace.id)
            .ok_or_else(|| {
                GovernorError::NotFound(format!("Workspace {} not found", workspace.id))
            })?;
        existing.clone_from(workspace);
        Ok(())
    }
}

/// Subscription store backed by a vector.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl InMemorySubscriptionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the lock is poisoned.
    pub fn insert(&self, subscription: Subscription) -> Result<()> {
        self.subscriptions.write().map_err(poisoned)?.push(subscription);
        Ok(())
    }

    /// Removes a subscription, returning it if present.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the lock is poisoned.
    pub fn remove(&self, id: &SubscriptionId) -> Result<Option<Subscription>> {
        let mut subscriptions = self.subscriptions.write().map_err(poisoned)?;
        Ok(subscriptions
            .iter()
            .position(|subscription| &subscription.id == id)
            .map(|index| subscriptions.remove(index)))
    }
}

impl SubscriptionStore for InMemorySubscriptionStore {
    fn list_subscriptions(
        &self,
        account_id: &AccountId,
        service_id: &ServiceId,
    ) -> Result<Vec<Subscription>> {
        let subscriptions = self.subscriptions.read().map_err(poisoned)?;
        Ok(subscriptions
            .iter()
            .filter(|sub| &sub.account_id == account_id && &sub.service_id == service_id)
            .cloned()
            .collect())
    }
}
