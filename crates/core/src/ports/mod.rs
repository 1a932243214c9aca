pub mod discovery;
pub mod git;
pub mod history;

// Re-exports
pub use discovery::*;
pub use git::*;
pub use history::*;
