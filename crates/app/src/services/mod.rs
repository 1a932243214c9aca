pub mod scm_service;

pub use scm_service::{ProviderOptions, ScmService};
