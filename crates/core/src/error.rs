use std::sync::Arc;
use thiserror::Error;

/// Core source control errors
#[derive(Error, Debug, Clone)]
pub enum ScmError {
    #[error("Provider not found: {id}")]
    ProviderNotFound { id: String },

    #[error("Resource group not found: {group} (provider {provider})")]
    GroupNotFound { provider: String, group: String },

    #[error("No history provider registered for {provider}")]
    NoHistoryProvider { provider: String },

    #[error("Duplicate provider id: {id}")]
    DuplicateProvider { id: String },

    #[error("Duplicate resource group: {group} (provider {provider})")]
    DuplicateGroup { provider: String, group: String },

    #[error("Nothing to commit in {provider}")]
    NothingToCommit { provider: String },

    #[error("Commit message is empty")]
    EmptyMessage,

    #[error("Invalid commit message: {reason}")]
    InvalidMessage { reason: String },

    #[error("A commit is already in progress for {provider}")]
    CommitInProgress { provider: String },

    #[error("Commit cancelled for {provider}")]
    Cancelled { provider: String },

    #[error("External operation failed: {cause:#}")]
    External { cause: Arc<anyhow::Error> },
}

/// Coarse classification used by callers deciding whether to surface an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A provider, group or history provider is absent
    NotFound,
    /// The operation's preconditions do not hold; nothing was mutated
    PreconditionFailed,
    /// The operation conflicts with existing state or an operation in flight
    Conflict,
    /// An external collaborator (git) failed
    ExternalFailure,
}

impl ScmError {
    pub fn external(cause: anyhow::Error) -> Self {
        Self::External {
            cause: Arc::new(cause),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProviderNotFound { .. }
            | Self::GroupNotFound { .. }
            | Self::NoHistoryProvider { .. } => ErrorKind::NotFound,
            Self::NothingToCommit { .. }
            | Self::EmptyMessage
            | Self::InvalidMessage { .. }
            | Self::Cancelled { .. } => ErrorKind::PreconditionFailed,
            Self::DuplicateProvider { .. }
            | Self::DuplicateGroup { .. }
            | Self::CommitInProgress { .. } => ErrorKind::Conflict,
            Self::External { .. } => ErrorKind::ExternalFailure,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, ScmError>;
