//! Mercury SCM Core - source control resource-group model
//!
//! This crate holds the provider registry, resource groups, the aggregate
//! pending-change count, stage/unstage transitions and the commit protocol,
//! together with the ports (traits) that adapters implement. It performs no
//! I/O: Git access, configuration and logging live in the `mercury-scm` crate.

pub mod app;
pub mod domain;
pub mod error;
pub mod ports;
pub mod scm;

// Re-exports for ergonomics
pub use domain::*;
pub use error::*;
pub use scm::{CancellationToken, CommitTicket, ScmFramework, SubscriptionId, Transition};
