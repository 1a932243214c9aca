use crate::domain::{Commit, ProviderId};
use anyhow::Result;

/// Port for commit history attached to a provider
pub trait HistoryProvider: Send {
    /// Identifier of this history provider
    fn id(&self) -> &str;

    /// Provider whose repository this history describes
    fn provider_id(&self) -> &ProviderId;

    /// Most recent commits, newest first
    fn history(&self, limit: usize) -> Result<Vec<Commit>>;

    /// Release any held resources; called once when the framework disposes it
    fn dispose(&mut self) {}
}
