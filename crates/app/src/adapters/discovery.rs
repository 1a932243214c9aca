use anyhow::{Context, Result};
use mercury_scm_core::ports::{DiscoverReq, DiscoveryPort};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File system discovery adapter that implements DiscoveryPort
#[derive(Debug, Default)]
pub struct FsDiscoveryAdapter;

impl FsDiscoveryAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Find all git repository roots below the given base path, sorted by path
    fn find_repos(&self, base_path: &Path) -> Result<Vec<PathBuf>> {
        let mut repositories = Vec::new();

        for entry in WalkDir::new(base_path).into_iter().filter_entry(|e| {
            // Skip .git directories and don't descend into them
            if e.file_name() == ".git" {
                return false;
            }

            // Nested directories of a repository are not scanned
            if let Some(parent) = e.path().parent() {
                if parent.join(".git").exists() && parent != base_path {
                    return false;
                }
            }

            true
        }) {
            let entry = entry.context("Failed to read directory entry")?;

            if entry.path().join(".git").is_dir() {
                repositories.push(entry.path().to_path_buf());
            }
        }

        repositories.sort();
        Ok(repositories)
    }
}

/// Display label for a repository: its directory name
pub fn repository_label(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string())
}

impl DiscoveryPort for FsDiscoveryAdapter {
    fn scan(&self, req: DiscoverReq) -> Result<Vec<PathBuf>> {
        self.find_repos(&req.base)
    }
}
