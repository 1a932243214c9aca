use super::{
    commit::CommitId,
    provider::ProviderId,
    resource::{ResourceState, ResourceUri},
};
use crate::error::ScmError;

/// The aggregate pending-change count moved to a new value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountChanged {
    pub count: usize,
}

/// A resource group's contents were created or changed
#[derive(Debug, Clone, PartialEq)]
pub struct GroupChanged {
    pub provider_id: ProviderId,
    pub group_id: String,
    pub resource_states: Vec<ResourceState>,
}

/// A resource moved between the "changes" and "staged" groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    Staged { provider_id: ProviderId, uri: ResourceUri },
    Unstaged { provider_id: ProviderId, uri: ResourceUri },
}

/// Commit lifecycle notifications
#[derive(Debug, Clone)]
pub enum CommitEvent {
    /// Preconditions held and the provider entered the committing state
    Started { provider_id: ProviderId, message: String },

    /// The commit landed; staged group and input box were cleared
    Committed {
        provider_id: ProviderId,
        message: String,
        commit_id: CommitId,
    },

    /// The commit was rejected or failed; no resource state was changed
    Failed { provider_id: ProviderId, error: ScmError },
}

/// Provider registration lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    Registered { provider_id: ProviderId },
    Disposed { provider_id: ProviderId },
}

/// Request for the command dispatcher to execute an abstract command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: String,
    pub arguments: Vec<String>,
}

/// Every notification the framework emits, for consumers that want one stream
#[derive(Debug, Clone)]
pub enum Event {
    Count(CountChanged),
    Group(GroupChanged),
    Transition(TransitionEvent),
    Commit(CommitEvent),
    Provider(ProviderEvent),
    Command(CommandRequest),

    /// An error outside the commit protocol (for example a failed status refresh)
    Error { provider_id: Option<ProviderId>, msg: String },
}
