//! Outcomes of apply and revert passes.

use uuid::Uuid;

use super::Tier;
use crate::{error::GovernorError, model::WorkspaceId};

/// Result of a successful apply pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// Correlation id of the pass.
    pub pass_id: Uuid,
    /// Tier the limits were taken from.
    pub tier: Tier,
    /// RAM granted to the allocation holder, in megabytes.
    pub ram_megabytes: u64,
    /// Workspace holding the account's RAM allocation.
    pub allocated_to: WorkspaceId,
    /// Workspaces written, in processing order.
    pub workspaces_updated: Vec<WorkspaceId>,
}

/// A workspace the revert pass could not persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertFailure {
    /// Workspace that kept its quota attributes.
    pub workspace_id: WorkspaceId,
    /// Error returned by the workspace store.
    pub error: GovernorError,
}

/// Result of a revert pass.
///
/// Reverting is best-effort: a failing workspace is recorded here and the pass moves
/// on to the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertReport {
    /// Correlation id of the pass.
    pub pass_id: Uuid,
    /// Workspaces whose quota attributes were removed, in processing order.
    pub reverted: Vec<WorkspaceId>,
    /// Workspaces that could not be written.
    pub failures: Vec<RevertFailure>,
}

impl RevertReport {
    pub(crate) fn new(pass_id: Uuid) -> Self {
        Self { pass_id, reverted: Vec::new(), failures: Vec::new() }
    }

    /// Returns true if every workspace was reverted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of workspaces the pass visited.
    #[must_use]
    pub fn visited(&self) -> usize {
        self.reverted.len() + self.failures.len()
    }
}
