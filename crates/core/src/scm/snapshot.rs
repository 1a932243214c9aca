use std::path::PathBuf;

use super::framework::ScmFramework;
use crate::domain::{
    Decorations, FileStatus, Provider, ResourceState, ScmCommand, StatusEntry, StatusSnapshot,
    CHANGES_GROUP, CONFLICTED_GROUP, DEFAULT_GROUPS, STAGED_GROUP, UNTRACKED_GROUP,
};
use crate::error::Result;

/// Build the resource state shown for one status entry of `provider`'s `group_id`.
///
/// The URI is the entry path joined onto the provider root (the bare path when
/// the provider has none); the attached command asks the dispatcher to open it.
pub fn resource_state_for(provider: &Provider, group_id: &str, entry: &StatusEntry) -> ResourceState {
    let uri = match provider.root_path() {
        Some(root) => root.join(&entry.path).to_string_lossy().to_string(),
        None => entry.path.clone(),
    };

    let open = ScmCommand::new(format!("{}.openResource", provider.id()), "Open File")
        .with_tooltip(entry.status.label())
        .with_argument(uri.clone());

    let slug = entry.status.slug();
    let decorations = Decorations {
        tooltip: Some(entry.status.label().to_string()),
        icon_light: Some(PathBuf::from(format!("icons/light/status-{}.svg", slug))),
        icon_dark: Some(PathBuf::from(format!("icons/dark/status-{}.svg", slug))),
        strike_through: entry.status == FileStatus::Deleted,
        faded: entry.status == FileStatus::Ignored,
    };

    ResourceState::new(uri)
        .with_status(entry.status)
        .with_command(open)
        .with_decorations(decorations)
        .with_context_value(group_id)
}

impl ScmFramework {
    /// Create whichever of the four default Git groups the provider lacks.
    /// Conflicts and untracked files are hidden while empty.
    pub fn ensure_default_groups(&mut self, provider_id: &str) -> Result<()> {
        for (group_id, label) in DEFAULT_GROUPS {
            if self.group(provider_id, group_id).is_some() {
                continue;
            }
            self.create_group(provider_id, group_id, label)?;
            if group_id == CONFLICTED_GROUP || group_id == UNTRACKED_GROUP {
                self.set_hide_when_empty(provider_id, group_id, true)?;
            }
        }
        Ok(())
    }

    /// Replace the four default groups with a status snapshot from the Git data source
    pub fn apply_status_snapshot(&mut self, provider_id: &str, snapshot: &StatusSnapshot) -> Result<()> {
        self.ensure_default_groups(provider_id)?;

        let lists = [
            (CONFLICTED_GROUP, &snapshot.conflicted),
            (STAGED_GROUP, &snapshot.staged),
            (CHANGES_GROUP, &snapshot.unstaged),
            (UNTRACKED_GROUP, &snapshot.untracked),
        ];
        for (group_id, entries) in lists {
            let provider = self
                .provider(provider_id)
                .ok_or_else(|| crate::error::ScmError::ProviderNotFound { id: provider_id.to_string() })?;
            let states = entries
                .iter()
                .map(|entry| resource_state_for(provider, group_id, entry))
                .collect();
            self.replace_group_contents(provider_id, group_id, states)?;
        }
        Ok(())
    }
}
