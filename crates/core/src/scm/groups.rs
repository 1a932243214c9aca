use super::framework::ScmFramework;
use crate::domain::{GroupChanged, ProviderId, ResourceGroup, ResourceState};
use crate::error::{Result, ScmError};

impl ScmFramework {
    /// Append a new, empty group to a provider. Group ids are unique per provider.
    pub fn create_group(
        &mut self,
        provider_id: &str,
        group_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<&ResourceGroup> {
        let group_id = group_id.into();
        let provider = self.provider_mut(provider_id)?;
        if provider.group(&group_id).is_some() {
            return Err(ScmError::DuplicateGroup {
                provider: provider_id.to_string(),
                group: group_id,
            });
        }
        provider.push_group(ResourceGroup::new(group_id.clone(), label.into()));
        let provider_id = provider.id().clone();

        self.notify_group(&provider_id, &group_id);
        self.group(provider_id.as_str(), &group_id)
            .ok_or(ScmError::GroupNotFound {
                provider: provider_id.to_string(),
                group: group_id,
            })
    }

    pub fn group(&self, provider_id: &str, group_id: &str) -> Option<&ResourceGroup> {
        self.provider(provider_id)?.group(group_id)
    }

    /// Groups of a provider the UI should render (empty hide-when-empty groups omitted)
    pub fn visible_groups(&self, provider_id: &str) -> Result<Vec<&ResourceGroup>> {
        let provider = self
            .provider(provider_id)
            .ok_or_else(|| ScmError::ProviderNotFound { id: provider_id.to_string() })?;
        Ok(provider.visible_groups().collect())
    }

    pub fn set_hide_when_empty(&mut self, provider_id: &str, group_id: &str, hide: bool) -> Result<()> {
        self.provider_mut(provider_id)?
            .group_mut(group_id)?
            .set_hide_when_empty(hide);
        Ok(())
    }

    /// Replace a group's resource states wholesale
    pub fn replace_group_contents(
        &mut self,
        provider_id: &str,
        group_id: &str,
        states: Vec<ResourceState>,
    ) -> Result<()> {
        let provider = self.provider_mut(provider_id)?;
        provider.group_mut(group_id)?.replace(states);
        let provider_id = provider.id().clone();
        self.notify_group(&provider_id, group_id);
        Ok(())
    }

    /// Append a resource state to a group
    pub fn add_resource(&mut self, provider_id: &str, group_id: &str, state: ResourceState) -> Result<()> {
        let provider = self.provider_mut(provider_id)?;
        provider.group_mut(group_id)?.push(state);
        let provider_id = provider.id().clone();
        self.notify_group(&provider_id, group_id);
        Ok(())
    }

    /// Remove the state with `uri` from a group. `Ok(None)` if the group holds no such state;
    /// nothing is announced in that case.
    pub fn remove_resource(
        &mut self,
        provider_id: &str,
        group_id: &str,
        uri: &str,
    ) -> Result<Option<ResourceState>> {
        let provider = self.provider_mut(provider_id)?;
        let removed = provider.group_mut(group_id)?.take(uri);
        let provider_id = provider.id().clone();
        if removed.is_some() {
            self.notify_group(&provider_id, group_id);
        }
        Ok(removed)
    }

    /// Replace the state with the same URI, or append it. Returns true when inserted.
    pub fn upsert_resource(&mut self, provider_id: &str, group_id: &str, state: ResourceState) -> Result<bool> {
        let provider = self.provider_mut(provider_id)?;
        let inserted = provider.group_mut(group_id)?.upsert(state);
        let provider_id = provider.id().clone();
        self.notify_group(&provider_id, group_id);
        Ok(inserted)
    }

    /// Announce a group's current contents, then recount
    pub(crate) fn notify_group(&mut self, provider_id: &ProviderId, group_id: &str) {
        let Some(group) = self
            .providers
            .get(provider_id.as_str())
            .and_then(|p| p.group(group_id))
        else {
            return;
        };

        let event = GroupChanged {
            provider_id: provider_id.clone(),
            group_id: group_id.to_string(),
            resource_states: group.resource_states().to_vec(),
        };
        self.listeners.group.emit(&event);
        self.recount();
    }
}
