use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{
    group::ResourceGroup,
    input::InputBox,
    resource::ScmCommand,
};
use crate::error::{Result, ScmError};

/// Unique identifier for a source control provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProviderId(pub String);

impl ProviderId {
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ProviderId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProviderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One registered source control backend (for example one Git repository)
#[derive(Debug, Clone)]
pub struct Provider {
    id: ProviderId,
    label: String,
    root_path: Option<PathBuf>,
    input_box: InputBox,
    groups: Vec<ResourceGroup>,
    status_bar_commands: Vec<ScmCommand>,
    accept_input_command: Option<ScmCommand>,
    committing: bool,
}

impl Provider {
    pub(crate) fn new(id: ProviderId, label: String, root_path: Option<PathBuf>) -> Self {
        Self {
            id,
            label,
            root_path,
            input_box: InputBox::default(),
            groups: Vec::new(),
            status_bar_commands: Vec::new(),
            accept_input_command: None,
            committing: false,
        }
    }

    pub fn id(&self) -> &ProviderId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn root_path(&self) -> Option<&Path> {
        self.root_path.as_deref()
    }

    pub fn input_box(&self) -> &InputBox {
        &self.input_box
    }

    pub fn groups(&self) -> &[ResourceGroup] {
        &self.groups
    }

    pub fn group(&self, group_id: &str) -> Option<&ResourceGroup> {
        self.groups.iter().find(|g| g.id() == group_id)
    }

    pub fn status_bar_commands(&self) -> &[ScmCommand] {
        &self.status_bar_commands
    }

    pub fn accept_input_command(&self) -> Option<&ScmCommand> {
        self.accept_input_command.as_ref()
    }

    pub fn is_committing(&self) -> bool {
        self.committing
    }

    /// Pending changes across this provider's groups
    pub fn count(&self) -> usize {
        self.groups.iter().map(ResourceGroup::len).sum()
    }

    /// Groups the UI should render, in registration order
    pub fn visible_groups(&self) -> impl Iterator<Item = &ResourceGroup> {
        self.groups.iter().filter(|g| g.is_visible())
    }

    pub(crate) fn push_group(&mut self, group: ResourceGroup) {
        self.groups.push(group);
    }

    pub(crate) fn group_index(&self, group_id: &str) -> Result<usize> {
        self.groups
            .iter()
            .position(|g| g.id() == group_id)
            .ok_or_else(|| ScmError::GroupNotFound {
                provider: self.id.to_string(),
                group: group_id.to_string(),
            })
    }

    pub(crate) fn group_mut(&mut self, group_id: &str) -> Result<&mut ResourceGroup> {
        let index = self.group_index(group_id)?;
        Ok(&mut self.groups[index])
    }

    /// Mutable access to two distinct groups at once
    pub(crate) fn group_pair_mut(
        &mut self,
        first: &str,
        second: &str,
    ) -> Result<(&mut ResourceGroup, &mut ResourceGroup)> {
        let a = self.group_index(first)?;
        let b = self.group_index(second)?;
        if a == b {
            return Err(ScmError::DuplicateGroup {
                provider: self.id.to_string(),
                group: first.to_string(),
            });
        }
        if a < b {
            let (left, right) = self.groups.split_at_mut(b);
            Ok((&mut left[a], &mut right[0]))
        } else {
            let (left, right) = self.groups.split_at_mut(a);
            Ok((&mut right[0], &mut left[b]))
        }
    }

    pub(crate) fn input_box_mut(&mut self) -> &mut InputBox {
        &mut self.input_box
    }

    pub(crate) fn set_status_bar_commands(&mut self, commands: Vec<ScmCommand>) {
        self.status_bar_commands = commands;
    }

    pub(crate) fn set_accept_input_command(&mut self, command: Option<ScmCommand>) {
        self.accept_input_command = command;
    }

    pub(crate) fn set_committing(&mut self, committing: bool) {
        self.committing = committing;
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.root_path {
            Some(root) => write!(f, "{} ({})", self.label, root.display()),
            None => write!(f, "{}", self.label),
        }
    }
}
