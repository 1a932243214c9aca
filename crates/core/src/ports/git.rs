use crate::domain::{CommitId, ResourceState, StatusSnapshot};
use anyhow::Result;
use std::path::Path;

/// Port for the Git data source that feeds resource groups
pub trait StatusSource: Send + Sync {
    /// Read the full working-tree status of the repository at `root`.
    /// This is blocking - caller should run in spawn_blocking
    fn snapshot(&self, root: &Path) -> Result<StatusSnapshot>;
}

/// Port for the external operation behind the commit protocol
pub trait CommitBackend: Send + Sync {
    /// Record `staged` as a new commit with `message`.
    /// This is blocking - caller should run in spawn_blocking
    fn commit(&self, root: Option<&Path>, message: &str, staged: &[ResourceState]) -> Result<CommitId>;
}
