use crate::domain::{
    CommandRequest, CommitEvent, CountChanged, GroupChanged, ProviderEvent, TransitionEvent,
};

/// Handle returned on subscription; pass it back to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Box<dyn FnMut(&T) + Send>;

/// Callbacks for one notification kind, invoked in registration order
pub struct Listeners<T> {
    entries: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Listeners<T> {
    pub(crate) fn insert(&mut self, id: SubscriptionId, callback: Callback<T>) {
        self.entries.push((id, callback));
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: &T) {
        for (_, callback) in self.entries.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One listener list per notification kind
#[derive(Default)]
pub(crate) struct EventListeners {
    next_id: u64,
    pub count: Listeners<CountChanged>,
    pub group: Listeners<GroupChanged>,
    pub transition: Listeners<TransitionEvent>,
    pub commit: Listeners<CommitEvent>,
    pub provider: Listeners<ProviderEvent>,
    pub command: Listeners<CommandRequest>,
}

impl EventListeners {
    pub fn allocate(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        self.count.remove(id)
            || self.group.remove(id)
            || self.transition.remove(id)
            || self.commit.remove(id)
            || self.provider.remove(id)
            || self.command.remove(id)
    }

    pub fn clear(&mut self) {
        self.count = Listeners::default();
        self.group = Listeners::default();
        self.transition = Listeners::default();
        self.commit = Listeners::default();
        self.provider = Listeners::default();
        self.command = Listeners::default();
    }
}
