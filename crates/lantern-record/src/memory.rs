//! In-memory implementation of the record store interface.
//!
//! Suitable for tests and development. Data is lost on drop; the shipping
//! client supplies a durable backend behind the same traits. Sync requests
//! are captured rather than dispatched, so tests can assert on them.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::ids::{PeerGroupId, PinnedItemId};
use crate::store::{PreferencesKey, RecordStore, SharedDataKey, StoreScope};
use crate::value::Record;

#[derive(Default)]
struct MemoryState {
    shared: BTreeMap<String, Record>,
    preferences: BTreeMap<String, Record>,
    pinned: BTreeMap<i32, Vec<PinnedItemId>>,
    sync_requests: Vec<PeerGroupId>,
}

/// Record store backed by process memory.
///
/// The mutex is the transaction boundary: the closure passed to
/// [`RecordStore::transaction`] runs synchronously under the lock, so two
/// scopes on the same handle are never concurrent.
#[derive(Default)]
pub struct MemoryRecordStore {
    state: Mutex<MemoryState>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the pinned-sync requests captured so far, oldest first.
    pub fn take_sync_requests(&self) -> Vec<PeerGroupId> {
        std::mem::take(&mut self.state.lock().sync_requests)
    }

    /// Serialize the store contents to JSON (development tooling).
    pub fn export_snapshot(&self) -> Result<String, StoreError> {
        let state = self.state.lock();
        let snapshot = Snapshot {
            shared: state.shared.clone(),
            preferences: state.preferences.clone(),
            pinned: state
                .pinned
                .iter()
                .map(|(group, items)| (*group, items.clone()))
                .collect(),
        };
        serde_json::to_string(&snapshot).map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    /// Replace the store contents from a snapshot produced by
    /// [`export_snapshot`](Self::export_snapshot).
    pub fn import_snapshot(&self, json: &str) -> Result<(), StoreError> {
        let snapshot: Snapshot =
            serde_json::from_str(json).map_err(|e| StoreError::Snapshot(e.to_string()))?;
        let mut state = self.state.lock();
        state.shared = snapshot.shared;
        state.preferences = snapshot.preferences;
        state.pinned = snapshot.pinned.into_iter().collect();
        state.sync_requests.clear();
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    shared: BTreeMap<String, Record>,
    preferences: BTreeMap<String, Record>,
    pinned: Vec<(i32, Vec<PinnedItemId>)>,
}

struct MemoryScope<'a> {
    state: &'a mut MemoryState,
}

impl StoreScope for MemoryScope<'_> {
    fn get_shared_record(&self, key: SharedDataKey) -> Option<Record> {
        self.state.shared.get(key.0).cloned()
    }

    fn set_shared_record(&mut self, key: SharedDataKey, record: Record) {
        self.state.shared.insert(key.0.to_owned(), record);
    }

    fn get_preferences_record(&self, key: PreferencesKey) -> Option<Record> {
        self.state.preferences.get(key.0).cloned()
    }

    fn set_preferences_record(&mut self, key: PreferencesKey, record: Record) {
        self.state.preferences.insert(key.0.to_owned(), record);
    }

    fn pinned_item_ids(&self, group: PeerGroupId) -> Vec<PinnedItemId> {
        self.state.pinned.get(&group.0).cloned().unwrap_or_default()
    }

    fn set_pinned_item_ids(&mut self, group: PeerGroupId, item_ids: Vec<PinnedItemId>) {
        self.state.pinned.insert(group.0, item_ids);
    }

    fn request_pinned_sync(&mut self, group: PeerGroupId) {
        tracing::debug!(group = group.0, "pinned sync requested");
        self.state.sync_requests.push(group);
    }
}

impl RecordStore for MemoryRecordStore {
    fn transaction<T, F>(&self, f: F) -> impl std::future::Future<Output = Result<T, StoreError>> + Send
    where
        F: FnOnce(&mut dyn StoreScope) -> T + Send,
        T: Send,
    {
        async move {
            let mut state = self.state.lock();
            let mut scope = MemoryScope { state: &mut state };
            Ok(f(&mut scope))
        }
    }
}
