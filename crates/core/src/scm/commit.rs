use std::collections::HashSet;
use std::path::PathBuf;

use super::cancel::CancellationToken;
use super::framework::ScmFramework;
use crate::domain::{CommitEvent, CommitId, ProviderId, ResourceState, STAGED_GROUP};
use crate::error::{Result, ScmError};
use crate::ports::CommitBackend;

/// Proof that a provider entered the committing state.
///
/// Holds the staged resources captured by [`ScmFramework::begin_commit`]; the
/// provider stays locked until the ticket is handed to
/// [`ScmFramework::finish_commit`] or [`ScmFramework::abort_commit`].
#[must_use = "a commit ticket must be finished or aborted to release the provider"]
#[derive(Debug)]
pub struct CommitTicket {
    provider_id: ProviderId,
    message: String,
    root_path: Option<PathBuf>,
    staged: Vec<ResourceState>,
    cancel: CancellationToken,
}

impl CommitTicket {
    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn root_path(&self) -> Option<&std::path::Path> {
        self.root_path.as_deref()
    }

    /// Resources that will be committed
    pub fn staged(&self) -> &[ResourceState] {
        &self.staged
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl ScmFramework {
    /// Validate a commit request and lock the provider for it.
    ///
    /// On any precondition failure a `CommitEvent::Failed` is emitted and no
    /// state changes.
    pub fn begin_commit(
        &mut self,
        provider_id: &str,
        message: &str,
        cancel: CancellationToken,
    ) -> Result<CommitTicket> {
        if let Err(err) = self.check_commit(provider_id, message) {
            self.commit_failed(ProviderId::from(provider_id), err.clone());
            return Err(err);
        }

        let provider = self.provider_mut(provider_id)?;
        provider.set_committing(true);
        let staged = provider
            .group(STAGED_GROUP)
            .map(|g| g.resource_states().to_vec())
            .unwrap_or_default();
        let ticket = CommitTicket {
            provider_id: provider.id().clone(),
            message: message.to_string(),
            root_path: provider.root_path().map(|p| p.to_path_buf()),
            staged,
            cancel,
        };

        self.listeners.commit.emit(&CommitEvent::Started {
            provider_id: ticket.provider_id.clone(),
            message: ticket.message.clone(),
        });
        Ok(ticket)
    }

    /// Complete a commit with the outcome of the external operation.
    ///
    /// The provider lock is released first, whatever happens. A failed outcome
    /// or a tripped cancellation token leaves every group untouched; otherwise
    /// the committed resources leave "staged", the input box is cleared and
    /// `CommitEvent::Committed` fires.
    pub fn finish_commit(&mut self, ticket: CommitTicket, outcome: anyhow::Result<CommitId>) -> Result<CommitId> {
        let CommitTicket {
            provider_id,
            message,
            staged,
            cancel,
            ..
        } = ticket;
        self.release_commit_lock(&provider_id);

        let commit_id = match outcome {
            Ok(_) if cancel.is_cancelled() => Err(ScmError::Cancelled {
                provider: provider_id.to_string(),
            }),
            Ok(commit_id) => Ok(commit_id),
            Err(cause) => Err(ScmError::external(cause)),
        };
        let commit_id = match commit_id {
            Ok(commit_id) => commit_id,
            Err(err) => {
                self.commit_failed(provider_id, err.clone());
                return Err(err);
            }
        };

        // The provider may have been disposed while the external call ran
        if self.provider(provider_id.as_str()).is_none() {
            let err = ScmError::ProviderNotFound {
                id: provider_id.to_string(),
            };
            self.commit_failed(provider_id, err.clone());
            return Err(err);
        }
        let provider = self.provider_mut(provider_id.as_str())?;

        let committed: HashSet<&str> = staged.iter().map(|s| s.uri.as_str()).collect();
        if let Ok(group) = provider.group_mut(STAGED_GROUP) {
            group.retain(|s| !committed.contains(s.uri.as_str()));
        }
        provider.input_box_mut().clear();

        self.notify_group(&provider_id, STAGED_GROUP);
        self.listeners.commit.emit(&CommitEvent::Committed {
            provider_id,
            message,
            commit_id: commit_id.clone(),
        });
        Ok(commit_id)
    }

    /// Release a ticket without committing; reported as a cancelled commit
    pub fn abort_commit(&mut self, ticket: CommitTicket) -> ScmError {
        let provider_id = ticket.provider_id;
        self.release_commit_lock(&provider_id);
        let err = ScmError::Cancelled {
            provider: provider_id.to_string(),
        };
        self.commit_failed(provider_id, err.clone());
        err
    }

    /// Run the whole commit protocol against a blocking backend
    pub fn commit(
        &mut self,
        provider_id: &str,
        message: &str,
        backend: &dyn CommitBackend,
        cancel: CancellationToken,
    ) -> Result<CommitId> {
        let ticket = self.begin_commit(provider_id, message, cancel)?;
        if ticket.is_cancelled() {
            return Err(self.abort_commit(ticket));
        }

        let outcome = backend.commit(ticket.root_path(), ticket.message(), ticket.staged());
        self.finish_commit(ticket, outcome)
    }

    fn check_commit(&self, provider_id: &str, message: &str) -> Result<()> {
        let provider = self
            .provider(provider_id)
            .ok_or_else(|| ScmError::ProviderNotFound { id: provider_id.to_string() })?;

        if provider.is_committing() {
            return Err(ScmError::CommitInProgress {
                provider: provider_id.to_string(),
            });
        }
        if message.trim().is_empty() {
            return Err(ScmError::EmptyMessage);
        }
        if let Some(validation) = provider.input_box().validate_value(message) {
            if validation.is_error() {
                return Err(ScmError::InvalidMessage {
                    reason: validation.message,
                });
            }
        }

        match provider.group(STAGED_GROUP) {
            Some(group) if !group.is_empty() => Ok(()),
            _ => Err(ScmError::NothingToCommit {
                provider: provider_id.to_string(),
            }),
        }
    }

    fn release_commit_lock(&mut self, provider_id: &ProviderId) {
        if let Ok(provider) = self.provider_mut(provider_id.as_str()) {
            provider.set_committing(false);
        }
    }

    fn commit_failed(&mut self, provider_id: ProviderId, error: ScmError) {
        self.listeners.commit.emit(&CommitEvent::Failed { provider_id, error });
    }
}
