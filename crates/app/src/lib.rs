//! Mercury SCM application library
//!
//! Git adapters, configuration, the command line and the service that drives
//! the source control framework from `mercury-scm-core`.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod render;
pub mod services;
