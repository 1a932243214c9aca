use anyhow::{Context, Result};
use git2::{Repository as GitRepository, Signature, Status, StatusOptions};
use mercury_scm_core::domain::{
    Author, Commit, CommitId, FileStatus, ProviderId, ResourceState, StatusEntry, StatusSnapshot,
    Timestamp, STAGED_GROUP,
};
use mercury_scm_core::ports::{CommitBackend, HistoryProvider, StatusSource};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Git adapter that implements the status source and commit backend using git2
#[derive(Debug, Default)]
pub struct GitAdapter;

impl GitAdapter {
    pub fn new() -> Self {
        Self
    }

    fn open_repo(root: &Path) -> Result<GitRepository> {
        GitRepository::open(root)
            .with_context(|| format!("Failed to open git repository at {}", root.display()))
    }
}

/// Category of the index side of a git status, if it has one
fn index_status(status: Status) -> Option<FileStatus> {
    if status.is_index_new() {
        Some(FileStatus::Added)
    } else if status.is_index_modified() {
        Some(FileStatus::Modified)
    } else if status.is_index_deleted() {
        Some(FileStatus::Deleted)
    } else if status.is_index_renamed() {
        Some(FileStatus::Renamed)
    } else if status.is_index_typechange() {
        Some(FileStatus::TypeChanged)
    } else {
        None
    }
}

/// Category of the working-tree side of a git status, if it has one
fn worktree_status(status: Status) -> Option<FileStatus> {
    if status.is_wt_new() {
        Some(FileStatus::Untracked)
    } else if status.is_wt_modified() {
        Some(FileStatus::Modified)
    } else if status.is_wt_deleted() {
        Some(FileStatus::Deleted)
    } else if status.is_wt_renamed() {
        Some(FileStatus::Renamed)
    } else if status.is_wt_typechange() {
        Some(FileStatus::TypeChanged)
    } else {
        None
    }
}

/// Repository-relative path of a resource URI produced for `root`
fn relative_path(root: &Path, uri: &str) -> PathBuf {
    let path = Path::new(uri);
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

impl StatusSource for GitAdapter {
    fn snapshot(&self, root: &Path) -> Result<StatusSnapshot> {
        let git_repo = Self::open_repo(root)?;

        let mut status_options = StatusOptions::new();
        status_options.include_untracked(true);
        status_options.include_ignored(false);
        status_options.recurse_untracked_dirs(true);
        status_options.renames_head_to_index(true);

        let statuses = git_repo
            .statuses(Some(&mut status_options))
            .context("Failed to get git status")?;

        let mut snapshot = StatusSnapshot::default();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                debug!("Skipping status entry with non UTF-8 path");
                continue;
            };
            let status = entry.status();

            if status.is_conflicted() {
                snapshot.conflicted.push(StatusEntry::new(path, FileStatus::Conflicted));
                continue;
            }
            if let Some(staged) = index_status(status) {
                snapshot.staged.push(StatusEntry::new(path, staged));
            }
            match worktree_status(status) {
                Some(FileStatus::Untracked) => {
                    snapshot.untracked.push(StatusEntry::new(path, FileStatus::Untracked));
                }
                Some(changed) => snapshot.unstaged.push(StatusEntry::new(path, changed)),
                None => {}
            }
        }

        debug!(
            "Status for {}: {} staged, {} unstaged, {} untracked, {} conflicted",
            root.display(),
            snapshot.staged.len(),
            snapshot.unstaged.len(),
            snapshot.untracked.len(),
            snapshot.conflicted.len()
        );
        Ok(snapshot)
    }
}

impl CommitBackend for GitAdapter {
    fn commit(&self, root: Option<&Path>, message: &str, staged: &[ResourceState]) -> Result<CommitId> {
        let root = root.context("Provider has no repository root")?;
        let git_repo = Self::open_repo(root)?;

        let mut index = git_repo.index().context("Failed to open index")?;
        for state in staged {
            // Index-side entries are committed as they sit in the index
            if state.context_value.as_deref() == Some(STAGED_GROUP) {
                continue;
            }
            let path = relative_path(root, state.uri.as_str());
            if state.status == Some(FileStatus::Deleted) {
                index
                    .remove_path(&path)
                    .with_context(|| format!("Failed to remove {} from index", path.display()))?;
            } else {
                index
                    .add_path(&path)
                    .with_context(|| format!("Failed to add {} to index", path.display()))?;
            }
        }
        index.write().context("Failed to write index")?;

        let tree_id = index.write_tree().context("Failed to write tree")?;
        let tree = git_repo.find_tree(tree_id)?;

        // Repositories without user.name/user.email still get a usable signature
        let signature = match git_repo.signature() {
            Ok(signature) => signature,
            Err(_) => Signature::now("Mercury SCM", "mercury-scm@localhost")?,
        };

        let parent = match git_repo.head() {
            Ok(head) => Some(head.peel_to_commit().context("HEAD does not point to a commit")?),
            Err(_) => None,
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = git_repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .context("Failed to create commit")?;

        Ok(CommitId(oid.to_string()))
    }
}

/// History provider reading the commit log of one repository
pub struct GitHistory {
    id: String,
    provider_id: ProviderId,
    root: PathBuf,
}

impl GitHistory {
    pub fn new(provider_id: ProviderId, root: PathBuf) -> Self {
        Self {
            id: format!("{}.history", provider_id),
            provider_id,
            root,
        }
    }
}

impl HistoryProvider for GitHistory {
    fn id(&self) -> &str {
        &self.id
    }

    fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    fn history(&self, limit: usize) -> Result<Vec<Commit>> {
        let git_repo = GitAdapter::open_repo(&self.root)?;

        // Unborn branch: nothing committed yet
        if git_repo.head().is_err() {
            return Ok(Vec::new());
        }

        let mut revwalk = git_repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk.take(limit) {
            let oid = oid?;
            let commit = git_repo.find_commit(oid)?;

            commits.push(Commit {
                id: CommitId(oid.to_string()),
                message: commit.summary().unwrap_or("").to_string(),
                author: Author {
                    name: commit.author().name().unwrap_or("").to_string(),
                    email: commit.author().email().unwrap_or("").to_string(),
                },
                timestamp: Timestamp::new(commit.time().seconds(), commit.time().offset_minutes()),
            });
        }

        Ok(commits)
    }

    fn dispose(&mut self) {
        debug!("Disposing history provider {}", self.id);
    }
}
