//! Record store interface.
//!
//! The physical store (B-tree, SQLite, whatever ships) lives outside this
//! crate; this module defines the contract the data layer programs against.
//! A store handle is passed explicitly to every manager call — there is no
//! global transaction manager.

use std::future::Future;

use crate::codec::RecordEntity;
use crate::error::StoreError;
use crate::ids::{PeerGroupId, PinnedItemId};
use crate::value::Record;

/// Key of a record shared across devices (synchronized account data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SharedDataKey(pub &'static str);

/// Key of a local preferences record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreferencesKey(pub &'static str);

/// Well-known record keys.
pub mod keys {
    use super::{PreferencesKey, SharedDataKey};

    /// User-defined chat folder collection.
    pub const CHAT_FOLDERS: SharedDataKey = SharedDataKey("chat-folders");
    /// Server-supplied limits configuration.
    pub const LIMITS: PreferencesKey = PreferencesKey("limits");
    /// Support / feedback URL shown in settings.
    pub const SUPPORT_URL: PreferencesKey = PreferencesKey("support-url");
}

/// One atomic read-modify-write view of the store.
///
/// A scope is handed to the closure passed to [`RecordStore::transaction`]
/// and is only valid inside it. The store serializes scopes touching the
/// same records; this layer never adds locking of its own.
pub trait StoreScope {
    fn get_shared_record(&self, key: SharedDataKey) -> Option<Record>;
    fn set_shared_record(&mut self, key: SharedDataKey, record: Record);

    fn get_preferences_record(&self, key: PreferencesKey) -> Option<Record>;
    fn set_preferences_record(&mut self, key: PreferencesKey, record: Record);

    /// Current pinned list for `group`, most-recently-pinned first.
    fn pinned_item_ids(&self, group: PeerGroupId) -> Vec<PinnedItemId>;
    fn set_pinned_item_ids(&mut self, group: PeerGroupId, item_ids: Vec<PinnedItemId>);

    /// Fire-and-forget request for the replication layer to reconcile the
    /// group's pinned list with the remote peer. Completion is not
    /// observable from this subsystem.
    fn request_pinned_sync(&mut self, group: PeerGroupId);
}

/// Handle to one profile's record store.
///
/// `transaction` runs `f` inside one atomic scope. Two scopes on the same
/// handle are never concurrent; scopes on different profiles are
/// independent. Once a scope begins it runs to completion — there is no
/// cancellation and no retry. A failed transaction leaves no partial state.
pub trait RecordStore: Send + Sync {
    fn transaction<T, F>(&self, f: F) -> impl Future<Output = Result<T, StoreError>> + Send
    where
        F: FnOnce(&mut dyn StoreScope) -> T + Send,
        T: Send;
}

/// Read and decode a shared entity, if the record exists.
pub fn get_shared_entity<E: RecordEntity>(
    scope: &dyn StoreScope,
    key: SharedDataKey,
) -> Option<E> {
    scope.get_shared_record(key).map(|record| E::decode(&record))
}

/// Read and decode a preferences entity, if the record exists.
pub fn get_preferences_entity<E: RecordEntity>(
    scope: &dyn StoreScope,
    key: PreferencesKey,
) -> Option<E> {
    scope
        .get_preferences_record(key)
        .map(|record| E::decode(&record))
}

/// Read a shared entity (or `None` if never written), apply `f`, and write
/// the result back — the canonical read-modify-write unit for shared data.
pub fn update_shared_entity<E, F>(scope: &mut dyn StoreScope, key: SharedDataKey, f: F)
where
    E: RecordEntity,
    F: FnOnce(Option<E>) -> E,
{
    let current = get_shared_entity(scope, key);
    let updated = f(current);
    scope.set_shared_record(key, updated.encode());
}
