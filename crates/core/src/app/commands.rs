use std::path::PathBuf;

use crate::domain::ProviderId;

/// Commands that can be sent to the source control service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Register a repository as a provider and load its status
    OpenRepository { root: PathBuf, label: Option<String> },

    /// Re-read status for one provider, or for all of them
    Refresh { provider_id: Option<ProviderId> },

    /// Move a resource from "changes" to "staged"
    Stage { provider_id: ProviderId, uri: String },

    /// Move a resource from "staged" to "changes"
    Unstage { provider_id: ProviderId, uri: String },

    /// Stage every resource in "changes"
    StageAll { provider_id: ProviderId },

    /// Replace the commit message in the input box
    SetInput { provider_id: ProviderId, value: String },

    /// Commit the staged group; uses the input box value when `message` is None
    Commit { provider_id: ProviderId, message: Option<String> },

    /// Remove a provider
    CloseRepository { provider_id: ProviderId },

    /// Stop processing commands
    Quit,
}
