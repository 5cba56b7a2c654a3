use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use gpui::SharedString;
use indexmap::IndexMap;

use super::controller::{FormResult, read_lock, write_lock};
use super::value::FieldName;

pub type SnapshotListener = Arc<dyn Fn(&FieldName, &SharedString) + Send + Sync>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Default)]
struct SnapshotState {
    values: IndexMap<FieldName, SharedString>,
    version: u64,
    next_subscription: u64,
    listeners: BTreeMap<SubscriptionId, SnapshotListener>,
}

/// Values of watched fields, owned apart from the field store.
///
/// Views that display a watched value subscribe here; they are notified only
/// when one of those fields changes, never for the rest of the form.
#[derive(Clone, Default)]
pub struct WatchSnapshot {
    state: Arc<RwLock<SnapshotState>>,
}

impl WatchSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` without notifying; existing entries are left alone.
    pub(super) fn seed(&self, name: FieldName, value: SharedString) -> FormResult<()> {
        let mut state = write_lock(&self.state, "seeding watch snapshot")?;
        state.values.entry(name).or_insert(value);
        Ok(())
    }

    pub fn push(&self, name: FieldName, value: SharedString) -> FormResult<()> {
        let listeners = {
            let mut state = write_lock(&self.state, "pushing watch snapshot value")?;
            state.values.insert(name.clone(), value.clone());
            state.version = state.version.wrapping_add(1);
            state.listeners.values().cloned().collect::<Vec<_>>()
        };
        tracing::trace!(field = %name, listeners = listeners.len(), "pushed watched value");

        for listener in listeners {
            listener(&name, &value);
        }
        Ok(())
    }

    pub fn values(&self) -> FormResult<IndexMap<FieldName, SharedString>> {
        Ok(read_lock(&self.state, "reading watch snapshot")?.values.clone())
    }

    pub fn get(&self, name: &str) -> FormResult<Option<SharedString>> {
        Ok(read_lock(&self.state, "reading watched value")?
            .values
            .get(name)
            .cloned())
    }

    pub fn contains(&self, name: &str) -> FormResult<bool> {
        Ok(read_lock(&self.state, "checking watched value")?
            .values
            .contains_key(name))
    }

    /// Bumped on every push.
    pub fn version(&self) -> FormResult<u64> {
        Ok(read_lock(&self.state, "reading watch snapshot version")?.version)
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&FieldName, &SharedString) + Send + Sync + 'static,
    ) -> FormResult<SubscriptionId> {
        let mut state = write_lock(&self.state, "subscribing to watch snapshot")?;
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.listeners.insert(id, Arc::new(listener));
        Ok(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> FormResult<bool> {
        Ok(write_lock(&self.state, "unsubscribing from watch snapshot")?
            .listeners
            .remove(&id)
            .is_some())
    }
}
