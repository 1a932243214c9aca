pub mod discovery;
pub mod git;

pub use discovery::{repository_label, FsDiscoveryAdapter};
pub use git::{GitAdapter, GitHistory};
