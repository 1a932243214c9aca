//! The source control resource-group model
//!
//! [`ScmFramework`] owns every provider, its resource groups and input box.
//! All writes go through its methods; each mutation recomputes the aggregate
//! count and notifies the typed listeners registered for that kind of change.
//! Callers only ever receive shared references or clones.

mod cancel;
mod commit;
mod count;
mod framework;
mod groups;
mod listeners;
mod snapshot;
mod transition;

pub use cancel::CancellationToken;
pub use commit::CommitTicket;
pub use count::{total_count, CountAggregator};
pub use framework::ScmFramework;
pub use listeners::{Listeners, SubscriptionId};
pub use snapshot::resource_state_for;
pub use transition::Transition;
