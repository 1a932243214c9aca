use indexmap::IndexMap;
use std::path::PathBuf;

use super::count::{total_count, CountAggregator};
use super::listeners::{EventListeners, SubscriptionId};
use crate::domain::{
    Commit, CommandRequest, CommitEvent, CountChanged, GroupChanged, InputValidation,
    InputValidator, Provider, ProviderEvent, ProviderId, ScmCommand, TransitionEvent,
};
use crate::error::{Result, ScmError};
use crate::ports::HistoryProvider;

/// Registry of source control providers and the single writer of their state
pub struct ScmFramework {
    pub(crate) providers: IndexMap<ProviderId, Provider>,
    history_providers: Vec<Box<dyn HistoryProvider>>,
    counter: CountAggregator,
    pub(crate) listeners: EventListeners,
}

impl Default for ScmFramework {
    fn default() -> Self {
        Self::new()
    }
}

impl ScmFramework {
    pub fn new() -> Self {
        Self {
            providers: IndexMap::new(),
            history_providers: Vec::new(),
            counter: CountAggregator::default(),
            listeners: EventListeners::default(),
        }
    }

    // ---- Provider registry ----

    /// Register a provider with no groups and a default input box
    pub fn create_provider(
        &mut self,
        id: impl Into<ProviderId>,
        label: impl Into<String>,
        root_path: Option<PathBuf>,
    ) -> Result<&Provider> {
        let id = id.into();
        if self.providers.contains_key(id.as_str()) {
            return Err(ScmError::DuplicateProvider { id: id.to_string() });
        }

        let provider = Provider::new(id.clone(), label.into(), root_path);
        self.providers.insert(id.clone(), provider);
        self.listeners.provider.emit(&ProviderEvent::Registered {
            provider_id: id.clone(),
        });

        self.provider(id.as_str())
            .ok_or(ScmError::ProviderNotFound { id: id.to_string() })
    }

    pub fn provider(&self, id: &str) -> Option<&Provider> {
        self.providers.get(id)
    }

    /// Providers in registration order
    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.providers.values()
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub(crate) fn provider_mut(&mut self, id: &str) -> Result<&mut Provider> {
        self.providers
            .get_mut(id)
            .ok_or_else(|| ScmError::ProviderNotFound { id: id.to_string() })
    }

    /// Remove a provider and any history providers attached to it
    pub fn dispose_provider(&mut self, id: &str) -> Result<Provider> {
        let provider = self
            .providers
            .shift_remove(id)
            .ok_or_else(|| ScmError::ProviderNotFound { id: id.to_string() })?;

        let (mut attached, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.history_providers)
            .into_iter()
            .partition(|h| h.provider_id().as_str() == id);
        self.history_providers = kept;
        for history in attached.iter_mut() {
            history.dispose();
        }

        self.listeners.provider.emit(&ProviderEvent::Disposed {
            provider_id: provider.id().clone(),
        });
        self.recount();
        Ok(provider)
    }

    /// Dispose every provider, then every remaining history provider
    pub fn dispose_all(&mut self) {
        for (provider_id, _) in std::mem::take(&mut self.providers) {
            self.listeners.provider.emit(&ProviderEvent::Disposed { provider_id });
        }
        for mut history in self.history_providers.drain(..) {
            history.dispose();
        }
        self.recount();
    }

    // ---- History providers ----

    pub fn register_history_provider(&mut self, history: Box<dyn HistoryProvider>) {
        self.history_providers.push(history);
    }

    pub fn history_provider_count(&self) -> usize {
        self.history_providers.len()
    }

    /// Recent commits from the first history provider attached to `provider_id`
    pub fn history(&self, provider_id: &str, limit: usize) -> Result<Vec<Commit>> {
        let history = self
            .history_providers
            .iter()
            .find(|h| h.provider_id().as_str() == provider_id)
            .ok_or_else(|| ScmError::NoHistoryProvider {
                provider: provider_id.to_string(),
            })?;
        history.history(limit).map_err(ScmError::external)
    }

    // ---- Input box ----

    pub fn set_input_value(&mut self, provider_id: &str, value: impl Into<String>) -> Result<()> {
        self.provider_mut(provider_id)?
            .input_box_mut()
            .set_value(value.into());
        Ok(())
    }

    pub fn set_input_placeholder(
        &mut self,
        provider_id: &str,
        placeholder: impl Into<String>,
    ) -> Result<()> {
        self.provider_mut(provider_id)?
            .input_box_mut()
            .set_placeholder(placeholder.into());
        Ok(())
    }

    pub fn set_input_enabled(&mut self, provider_id: &str, enabled: bool) -> Result<()> {
        self.provider_mut(provider_id)?
            .input_box_mut()
            .set_enabled(enabled);
        Ok(())
    }

    pub fn set_input_visible(&mut self, provider_id: &str, visible: bool) -> Result<()> {
        self.provider_mut(provider_id)?
            .input_box_mut()
            .set_visible(visible);
        Ok(())
    }

    pub fn set_input_validator(
        &mut self,
        provider_id: &str,
        validator: Option<InputValidator>,
    ) -> Result<()> {
        self.provider_mut(provider_id)?
            .input_box_mut()
            .set_validator(validator);
        Ok(())
    }

    /// Validate the provider's current input value
    pub fn validate_input(&self, provider_id: &str) -> Result<Option<InputValidation>> {
        let provider = self
            .provider(provider_id)
            .ok_or_else(|| ScmError::ProviderNotFound { id: provider_id.to_string() })?;
        Ok(provider.input_box().validate())
    }

    // ---- Commands ----

    pub fn set_status_bar_commands(
        &mut self,
        provider_id: &str,
        commands: Vec<ScmCommand>,
    ) -> Result<()> {
        self.provider_mut(provider_id)?
            .set_status_bar_commands(commands);
        Ok(())
    }

    pub fn set_accept_input_command(
        &mut self,
        provider_id: &str,
        command: Option<ScmCommand>,
    ) -> Result<()> {
        self.provider_mut(provider_id)?
            .set_accept_input_command(command);
        Ok(())
    }

    /// Ask the dispatcher to run the provider's accept-input command
    /// (`{provider}.commit` unless one was set) with the input value appended.
    pub fn accept_input(&mut self, provider_id: &str) -> Result<CommandRequest> {
        let provider = self.provider_mut(provider_id)?;
        let command = provider
            .accept_input_command()
            .cloned()
            .unwrap_or_else(|| ScmCommand::new(format!("{}.commit", provider_id), "Commit"));

        let mut arguments = command.arguments;
        arguments.push(provider.input_box().value().to_string());
        let request = CommandRequest {
            command: command.id,
            arguments,
        };
        self.listeners.command.emit(&request);
        Ok(request)
    }

    /// Ask the dispatcher to run the command attached to a resource, if any
    pub fn open_resource(
        &mut self,
        provider_id: &str,
        group_id: &str,
        uri: &str,
    ) -> Result<Option<CommandRequest>> {
        let provider = self.provider_mut(provider_id)?;
        let group = provider.group_mut(group_id)?;
        let request = group
            .get(uri)
            .and_then(|state| state.command.as_ref())
            .map(|command| CommandRequest {
                command: command.id.clone(),
                arguments: command.arguments.clone(),
            });

        if let Some(request) = &request {
            self.listeners.command.emit(request);
        }
        Ok(request)
    }

    // ---- Count ----

    /// Aggregate pending-change count as last published
    pub fn count(&self) -> usize {
        self.counter.current()
    }

    /// Recompute the aggregate count and announce it if it moved
    pub(crate) fn recount(&mut self) {
        let total = total_count(self.providers.values());
        if let Some(count) = self.counter.update(total) {
            self.listeners.count.emit(&CountChanged { count });
        }
    }

    // ---- Listener registration ----

    pub fn on_count_changed(
        &mut self,
        callback: impl FnMut(&CountChanged) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.listeners.allocate();
        self.listeners.count.insert(id, Box::new(callback));
        id
    }

    pub fn on_group_changed(
        &mut self,
        callback: impl FnMut(&GroupChanged) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.listeners.allocate();
        self.listeners.group.insert(id, Box::new(callback));
        id
    }

    pub fn on_transition(
        &mut self,
        callback: impl FnMut(&TransitionEvent) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.listeners.allocate();
        self.listeners.transition.insert(id, Box::new(callback));
        id
    }

    pub fn on_commit(
        &mut self,
        callback: impl FnMut(&CommitEvent) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.listeners.allocate();
        self.listeners.commit.insert(id, Box::new(callback));
        id
    }

    pub fn on_provider(
        &mut self,
        callback: impl FnMut(&ProviderEvent) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.listeners.allocate();
        self.listeners.provider.insert(id, Box::new(callback));
        id
    }

    pub fn on_command_requested(
        &mut self,
        callback: impl FnMut(&CommandRequest) + Send + 'static,
    ) -> SubscriptionId {
        let id = self.listeners.allocate();
        self.listeners.command.insert(id, Box::new(callback));
        id
    }

    /// Remove a listener of any kind; false if the id was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Drop every registered listener
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for ScmFramework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScmFramework")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("history_providers", &self.history_providers.len())
            .field("count", &self.counter.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ResourceState, CHANGES_GROUP, STAGED_GROUP};
    use std::sync::{Arc, Mutex};

    struct FakeHistory {
        provider_id: ProviderId,
        disposed: Arc<Mutex<Vec<String>>>,
    }

    impl HistoryProvider for FakeHistory {
        fn id(&self) -> &str {
            "fake"
        }

        fn provider_id(&self) -> &ProviderId {
            &self.provider_id
        }

        fn history(&self, _limit: usize) -> anyhow::Result<Vec<Commit>> {
            Ok(Vec::new())
        }

        fn dispose(&mut self) {
            self.disposed.lock().unwrap().push(self.provider_id.to_string());
        }
    }

    #[test]
    fn test_create_provider_rejects_duplicates() {
        let mut scm = ScmFramework::new();
        scm.create_provider("git", "Git", None).unwrap();

        let err = scm.create_provider("git", "Other", None).unwrap_err();
        assert!(matches!(err, ScmError::DuplicateProvider { .. }));
        assert_eq!(scm.provider("git").unwrap().label(), "Git");
    }

    #[test]
    fn test_providers_keep_insertion_order() {
        let mut scm = ScmFramework::new();
        for id in ["c", "a", "b"] {
            scm.create_provider(id, id.to_uppercase(), None).unwrap();
        }
        scm.dispose_provider("a").unwrap();

        let ids: Vec<_> = scm.providers().map(|p| p.id().as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn test_dispose_provider_recounts() {
        let mut scm = ScmFramework::new();
        scm.create_provider("git", "Git", None).unwrap();
        scm.create_group("git", CHANGES_GROUP, "Changes").unwrap();
        scm.replace_group_contents(
            "git",
            CHANGES_GROUP,
            vec![ResourceState::new("/a"), ResourceState::new("/b")],
        )
        .unwrap();
        assert_eq!(scm.count(), 2);

        let counts = Arc::new(Mutex::new(Vec::new()));
        let log = counts.clone();
        scm.on_count_changed(move |e| log.lock().unwrap().push(e.count));

        let disposed = scm.dispose_provider("git").unwrap();
        assert_eq!(disposed.count(), 2);
        assert_eq!(scm.count(), 0);
        assert_eq!(*counts.lock().unwrap(), vec![0]);
        assert!(scm.dispose_provider("git").unwrap_err().is_not_found());
    }

    #[test]
    fn test_dispose_all_disposes_history_providers() {
        let disposed = Arc::new(Mutex::new(Vec::new()));
        let mut scm = ScmFramework::new();
        scm.create_provider("one", "One", None).unwrap();
        scm.create_provider("two", "Two", None).unwrap();
        for id in ["one", "orphan"] {
            scm.register_history_provider(Box::new(FakeHistory {
                provider_id: ProviderId::from(id),
                disposed: disposed.clone(),
            }));
        }

        let events = Arc::new(Mutex::new(Vec::new()));
        let log = events.clone();
        scm.on_provider(move |e| log.lock().unwrap().push(e.clone()));

        scm.dispose_all();

        assert_eq!(scm.provider_count(), 0);
        assert_eq!(scm.history_provider_count(), 0);
        assert_eq!(*disposed.lock().unwrap(), vec!["one", "orphan"]);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                ProviderEvent::Disposed { provider_id: "one".into() },
                ProviderEvent::Disposed { provider_id: "two".into() },
            ]
        );
    }

    #[test]
    fn test_dispose_all_recounts_to_zero() {
        let mut scm = ScmFramework::new();
        scm.create_provider("one", "One", None).unwrap();
        scm.create_group("one", "changes", "Changes").unwrap();
        scm.add_resource("one", "changes", ResourceState::new("/a")).unwrap();
        scm.create_provider("two", "Two", None).unwrap();
        scm.create_group("two", "changes", "Changes").unwrap();
        scm.add_resource("two", "changes", ResourceState::new("/b")).unwrap();

        let counts = Arc::new(Mutex::new(Vec::new()));
        let log = counts.clone();
        scm.on_count_changed(move |e| log.lock().unwrap().push(e.count));

        scm.dispose_all();

        assert_eq!(scm.count(), 0);
        assert_eq!(*counts.lock().unwrap(), vec![0]);
    }

    #[test]
    fn test_history_without_provider_is_not_found() {
        let scm = ScmFramework::new();
        assert!(scm.history("git", 10).unwrap_err().is_not_found());
    }

    #[test]
    fn test_accept_input_emits_default_commit_command() {
        let mut scm = ScmFramework::new();
        scm.create_provider("git", "Git", None).unwrap();
        scm.set_input_value("git", "Fix parser").unwrap();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();
        scm.on_command_requested(move |r| log.lock().unwrap().push(r.clone()));

        let request = scm.accept_input("git").unwrap();
        assert_eq!(request.command, "git.commit");
        assert_eq!(request.arguments, vec!["Fix parser"]);
        assert_eq!(*requests.lock().unwrap(), vec![request]);
    }

    #[test]
    fn test_open_resource_emits_resource_command() {
        let mut scm = ScmFramework::new();
        scm.create_provider("git", "Git", None).unwrap();
        scm.create_group("git", STAGED_GROUP, "Staged").unwrap();
        let open = ScmCommand::new("git.openResource", "Open").with_argument("/f.ts");
        scm.add_resource("git", STAGED_GROUP, ResourceState::new("/f.ts").with_command(open))
            .unwrap();
        scm.add_resource("git", STAGED_GROUP, ResourceState::new("/plain.ts"))
            .unwrap();

        let request = scm.open_resource("git", STAGED_GROUP, "/f.ts").unwrap().unwrap();
        assert_eq!(request.command, "git.openResource");
        assert_eq!(request.arguments, vec!["/f.ts"]);
        assert!(scm.open_resource("git", STAGED_GROUP, "/plain.ts").unwrap().is_none());
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut scm = ScmFramework::new();
        let counts = Arc::new(Mutex::new(Vec::new()));
        let log = counts.clone();
        let id = scm.on_count_changed(move |e| log.lock().unwrap().push(e.count));

        scm.create_provider("git", "Git", None).unwrap();
        scm.create_group("git", CHANGES_GROUP, "Changes").unwrap();
        scm.add_resource("git", CHANGES_GROUP, ResourceState::new("/a")).unwrap();
        assert!(scm.unsubscribe(id));
        scm.add_resource("git", CHANGES_GROUP, ResourceState::new("/b")).unwrap();

        assert_eq!(*counts.lock().unwrap(), vec![1]);
        assert_eq!(scm.count(), 2);
    }
}
