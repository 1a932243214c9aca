pub mod commit;
pub mod events;
pub mod group;
pub mod input;
pub mod provider;
pub mod resource;
pub mod status;

// Re-exports for convenience
pub use commit::*;
pub use events::*;
pub use group::*;
pub use input::*;
pub use provider::*;
pub use resource::*;
pub use status::*;
