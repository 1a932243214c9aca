use super::framework::ScmFramework;
use crate::domain::{ProviderId, ResourceUri, TransitionEvent, CHANGES_GROUP, STAGED_GROUP};
use crate::error::Result;

/// Outcome of a move between groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transition {
    /// The resource was moved
    Moved,
    /// The resource was not in the source group; nothing changed
    #[default]
    Unchanged,
}

impl ScmFramework {
    /// Move a resource from "changes" to the end of "staged"
    pub fn stage(&mut self, provider_id: &str, uri: &str) -> Result<Transition> {
        let transition = self.move_resource(provider_id, uri, CHANGES_GROUP, STAGED_GROUP)?;
        if transition == Transition::Moved {
            self.listeners.transition.emit(&TransitionEvent::Staged {
                provider_id: ProviderId::from(provider_id),
                uri: ResourceUri::from(uri),
            });
        }
        Ok(transition)
    }

    /// Move a resource from "staged" back to the end of "changes"
    pub fn unstage(&mut self, provider_id: &str, uri: &str) -> Result<Transition> {
        let transition = self.move_resource(provider_id, uri, STAGED_GROUP, CHANGES_GROUP)?;
        if transition == Transition::Moved {
            self.listeners.transition.emit(&TransitionEvent::Unstaged {
                provider_id: ProviderId::from(provider_id),
                uri: ResourceUri::from(uri),
            });
        }
        Ok(transition)
    }

    /// Stage every resource in "changes", keeping their order. Returns how many moved.
    pub fn stage_all(&mut self, provider_id: &str) -> Result<usize> {
        let moved = self.move_all(provider_id, CHANGES_GROUP, STAGED_GROUP)?;
        for uri in &moved {
            self.listeners.transition.emit(&TransitionEvent::Staged {
                provider_id: ProviderId::from(provider_id),
                uri: uri.clone(),
            });
        }
        Ok(moved.len())
    }

    /// Unstage every resource in "staged", keeping their order. Returns how many moved.
    pub fn unstage_all(&mut self, provider_id: &str) -> Result<usize> {
        let moved = self.move_all(provider_id, STAGED_GROUP, CHANGES_GROUP)?;
        for uri in &moved {
            self.listeners.transition.emit(&TransitionEvent::Unstaged {
                provider_id: ProviderId::from(provider_id),
                uri: uri.clone(),
            });
        }
        Ok(moved.len())
    }

    /// Move the resource with `uri` from one group to the end of another, unchanged.
    /// Both groups must exist; a resource absent from `from` is left alone.
    /// A state with the same URI already in `to` is replaced in place.
    pub fn move_resource(&mut self, provider_id: &str, uri: &str, from: &str, to: &str) -> Result<Transition> {
        let provider = self.provider_mut(provider_id)?;
        if from == to {
            provider.group_mut(from)?;
            return Ok(Transition::Unchanged);
        }

        let (source, target) = provider.group_pair_mut(from, to)?;
        let Some(state) = source.take(uri) else {
            return Ok(Transition::Unchanged);
        };
        target.upsert(state);

        let provider_id = provider.id().clone();
        self.notify_group(&provider_id, from);
        self.notify_group(&provider_id, to);
        Ok(Transition::Moved)
    }

    fn move_all(&mut self, provider_id: &str, from: &str, to: &str) -> Result<Vec<ResourceUri>> {
        let provider = self.provider_mut(provider_id)?;
        let (source, target) = provider.group_pair_mut(from, to)?;
        let states = source.take_all();
        if states.is_empty() {
            return Ok(Vec::new());
        }

        let uris = states.iter().map(|s| s.uri.clone()).collect();
        for state in states {
            target.upsert(state);
        }

        let provider_id = provider.id().clone();
        self.notify_group(&provider_id, from);
        self.notify_group(&provider_id, to);
        Ok(uris)
    }
}
