use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::status::FileStatus;

/// URI of a changed resource; the key of a resource state within its group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceUri(pub String);

impl ResourceUri {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceUri {
    fn from(uri: &str) -> Self {
        Self(uri.to_string())
    }
}

impl From<String> for ResourceUri {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl std::fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An abstract command the core asks the dispatcher to execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScmCommand {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

impl ScmCommand {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            tooltip: None,
            arguments: Vec::new(),
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }
}

/// Presentation hints attached to a resource state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decorations {
    pub tooltip: Option<String>,
    pub icon_light: Option<PathBuf>,
    pub icon_dark: Option<PathBuf>,
    #[serde(default)]
    pub strike_through: bool,
    #[serde(default)]
    pub faded: bool,
}

/// One changed file within a resource group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    pub uri: ResourceUri,
    #[serde(default)]
    pub status: Option<FileStatus>,
    #[serde(default)]
    pub command: Option<ScmCommand>,
    #[serde(default)]
    pub decorations: Option<Decorations>,
    /// Tag used by the UI to pick the actions offered for this resource
    #[serde(default)]
    pub context_value: Option<String>,
}

impl ResourceState {
    pub fn new(uri: impl Into<ResourceUri>) -> Self {
        Self {
            uri: uri.into(),
            status: None,
            command: None,
            decorations: None,
            context_value: None,
        }
    }

    pub fn with_status(mut self, status: FileStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_command(mut self, command: ScmCommand) -> Self {
        self.command = Some(command);
        self
    }

    pub fn with_decorations(mut self, decorations: Decorations) -> Self {
        self.decorations = Some(decorations);
        self
    }

    pub fn with_context_value(mut self, context_value: impl Into<String>) -> Self {
        self.context_value = Some(context_value.into());
        self
    }
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} {}", status.letter(), self.uri),
            None => write!(f, "  {}", self.uri),
        }
    }
}
