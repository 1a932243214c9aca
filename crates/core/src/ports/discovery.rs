use anyhow::Result;
use std::path::PathBuf;

/// Request for repository discovery
#[derive(Clone, Debug)]
pub struct DiscoverReq {
    pub base: PathBuf,
}

/// Port for finding repositories that should become providers
pub trait DiscoveryPort: Send + Sync {
    /// Scan for repository roots below the given base directory
    /// This is blocking - caller should run in spawn_blocking
    fn scan(&self, req: DiscoverReq) -> Result<Vec<PathBuf>>;
}
