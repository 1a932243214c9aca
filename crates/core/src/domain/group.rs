use serde::Serialize;

use super::resource::ResourceState;

/// Group holding resources staged for the next commit
pub const STAGED_GROUP: &str = "staged";
/// Group holding tracked resources with working-tree changes
pub const CHANGES_GROUP: &str = "changes";
/// Group holding files git does not track yet
pub const UNTRACKED_GROUP: &str = "untracked";
/// Group holding files with merge conflicts
pub const CONFLICTED_GROUP: &str = "conflicted";

/// Default groups of a Git provider, in display order, with their labels
pub const DEFAULT_GROUPS: [(&str, &str); 4] = [
    (CONFLICTED_GROUP, "Merge Changes"),
    (STAGED_GROUP, "Staged Changes"),
    (CHANGES_GROUP, "Changes"),
    (UNTRACKED_GROUP, "Untracked Changes"),
];

/// A named bucket of resource states within a provider
///
/// Fields are only writable through `ScmFramework`, so every mutation is
/// followed by a recount and a change notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceGroup {
    id: String,
    label: String,
    hide_when_empty: bool,
    resource_states: Vec<ResourceState>,
}

impl ResourceGroup {
    pub(crate) fn new(id: String, label: String) -> Self {
        Self {
            id,
            label,
            hide_when_empty: false,
            resource_states: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn hide_when_empty(&self) -> bool {
        self.hide_when_empty
    }

    pub fn resource_states(&self) -> &[ResourceState] {
        &self.resource_states
    }

    pub fn len(&self) -> usize {
        self.resource_states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource_states.is_empty()
    }

    /// Whether the UI should render this group at all
    pub fn is_visible(&self) -> bool {
        !(self.hide_when_empty && self.is_empty())
    }

    pub fn get(&self, uri: &str) -> Option<&ResourceState> {
        self.resource_states.iter().find(|s| s.uri.as_str() == uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.get(uri).is_some()
    }

    pub(crate) fn set_hide_when_empty(&mut self, hide: bool) {
        self.hide_when_empty = hide;
    }

    pub(crate) fn replace(&mut self, states: Vec<ResourceState>) {
        self.resource_states = states;
    }

    pub(crate) fn push(&mut self, state: ResourceState) {
        self.resource_states.push(state);
    }

    /// Remove and return the state with the given URI
    pub(crate) fn take(&mut self, uri: &str) -> Option<ResourceState> {
        let index = self.resource_states.iter().position(|s| s.uri.as_str() == uri)?;
        Some(self.resource_states.remove(index))
    }

    pub(crate) fn take_all(&mut self) -> Vec<ResourceState> {
        std::mem::take(&mut self.resource_states)
    }

    /// Replace the state with the same URI in place, or append it.
    /// Returns true when the state was inserted.
    pub(crate) fn upsert(&mut self, state: ResourceState) -> bool {
        match self.resource_states.iter_mut().find(|s| s.uri == state.uri) {
            Some(existing) => {
                *existing = state;
                false
            }
            None => {
                self.resource_states.push(state);
                true
            }
        }
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&ResourceState) -> bool) {
        self.resource_states.retain(keep);
    }
}
