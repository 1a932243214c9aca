use indexmap::IndexMap;
use std::collections::HashSet;

use crate::domain::{CommitEvent, CommitId, Event, ProviderEvent, ProviderId, ResourceState};
use crate::error::ScmError;

/// Read-only projection of source control state for UI consumption.
///
/// Built purely from the event stream, so a consumer that only sees events
/// can render the same groups and badge count as the framework holds.
#[derive(Debug, Default)]
pub struct ReadProjection {
    /// Aggregate pending-change count
    pub count: usize,

    /// Group contents per provider, both in registration order
    pub providers: IndexMap<ProviderId, IndexMap<String, Vec<ResourceState>>>,

    /// Providers with a commit in flight
    pub committing: HashSet<ProviderId>,

    /// Last successful commit
    pub last_commit: Option<(ProviderId, CommitId)>,

    /// Last error reported through the event stream
    pub last_error: Option<String>,
}

impl ReadProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event to update the projection
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Count(changed) => {
                self.count = changed.count;
            }

            Event::Group(changed) => {
                self.providers
                    .entry(changed.provider_id.clone())
                    .or_default()
                    .insert(changed.group_id.clone(), changed.resource_states.clone());
            }

            Event::Provider(ProviderEvent::Registered { provider_id }) => {
                self.providers.entry(provider_id.clone()).or_default();
            }

            Event::Provider(ProviderEvent::Disposed { provider_id }) => {
                self.providers.shift_remove(provider_id);
                self.committing.remove(provider_id);
            }

            Event::Commit(CommitEvent::Started { provider_id, .. }) => {
                self.committing.insert(provider_id.clone());
            }

            Event::Commit(CommitEvent::Committed {
                provider_id,
                commit_id,
                ..
            }) => {
                self.committing.remove(provider_id);
                self.last_commit = Some((provider_id.clone(), commit_id.clone()));
            }

            Event::Commit(CommitEvent::Failed { provider_id, error }) => {
                // A rejected overlapping commit leaves the first one in flight
                if !matches!(error, ScmError::CommitInProgress { .. }) {
                    self.committing.remove(provider_id);
                }
                self.last_error = Some(error.to_string());
            }

            Event::Transition(_) | Event::Command(_) => {
                // Group events already carry the resulting contents
            }

            Event::Error { msg, .. } => {
                self.last_error = Some(msg.clone());
            }
        }
    }

    /// Resources of one group, empty when unknown
    pub fn group(&self, provider_id: &str, group_id: &str) -> &[ResourceState] {
        self.providers
            .get(provider_id)
            .and_then(|groups| groups.get(group_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pending changes of one provider
    pub fn provider_count(&self, provider_id: &str) -> usize {
        self.providers
            .get(provider_id)
            .map(|groups| groups.values().map(Vec::len).sum())
            .unwrap_or(0)
    }
}
