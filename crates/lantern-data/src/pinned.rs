//! Pinned conversation lists.
//!
//! Each chat-list group keeps an ordered list of pinned items, newest
//! first, bounded by a per-scope capacity from [`crate::LimitsConfig`].
//! Secret-chat pins and regular pins count against separate buckets of the
//! same limit. Successful mutations ask the replication layer to reconcile
//! the list with the remote peer.

use lantern_record::{PeerGroupId, PinnedItemId, RecordStore, StoreError, StoreScope};

use crate::settings::limits_config;

/// Outcome of a pin toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TogglePinnedResult {
    Done,
    /// The insert would exceed the capacity limit carried in the variant.
    /// Only produced under [`PinnedLimitPolicy::EnforceOnInsert`].
    LimitExceeded(i32),
}

/// How the capacity limit is applied when pinning.
///
/// Whether the limit should block the insert itself or only the sync signal
/// is an open product question, so both behaviors are available and the
/// caller picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinnedLimitPolicy {
    /// The shipped behavior: the local list mutates unconditionally and the
    /// limit only gates the remote sync signal.
    SyncGateOnly,
    /// Reject an over-limit insert before any mutation; removals always
    /// succeed.
    EnforceOnInsert,
}

/// Pin `item` if absent, unpin it if present.
///
/// Inserts go to the front of the list. The capacity check counts items of
/// the toggled item's class *before* the mutation; the sync signal is
/// emitted only when the resulting same-class count stays within the limit.
pub async fn toggle_item_pinned<S: RecordStore>(
    store: &S,
    group: PeerGroupId,
    item: PinnedItemId,
    policy: PinnedLimitPolicy,
) -> Result<TogglePinnedResult, StoreError> {
    store
        .transaction(move |scope| toggle_in_scope(scope, group, item, policy))
        .await
}

fn toggle_in_scope(
    scope: &mut dyn StoreScope,
    group: PeerGroupId,
    item: PinnedItemId,
    policy: PinnedLimitPolicy,
) -> TogglePinnedResult {
    let mut item_ids = scope.pinned_item_ids(group);

    // Same-class items, not counting the toggled item itself.
    let same_kind = item_ids
        .iter()
        .filter(|other| other.is_secret() == item.is_secret() && **other != item)
        .count() as i64;

    let removing = item_ids.contains(&item);
    let delta: i64 = if removing { -1 } else { 1 };
    let limit = limits_config(scope).max_pinned(group.is_root());

    if !removing && policy == PinnedLimitPolicy::EnforceOnInsert && same_kind + delta > i64::from(limit)
    {
        tracing::debug!(group = group.0, limit, "pin rejected, list is full");
        return TogglePinnedResult::LimitExceeded(limit);
    }

    if let Some(index) = item_ids.iter().position(|other| *other == item) {
        item_ids.remove(index);
        tracing::debug!(group = group.0, "item unpinned");
    } else {
        item_ids.insert(0, item);
        tracing::debug!(group = group.0, "item pinned");
    }

    if same_kind + delta <= i64::from(limit) {
        scope.request_pinned_sync(group);
    } else {
        tracing::debug!(group = group.0, limit, "pinned sync suppressed, over limit");
    }
    scope.set_pinned_item_ids(group, item_ids);

    TogglePinnedResult::Done
}

/// Replace the group's pinned order. Returns whether a write occurred.
///
/// A list identical to the stored one is a no-op. Only the root scope
/// triggers a sync on reorder, and only while within the root limit.
pub async fn reorder_pinned_items<S: RecordStore>(
    store: &S,
    group: PeerGroupId,
    item_ids: Vec<PinnedItemId>,
) -> Result<bool, StoreError> {
    store
        .transaction(move |scope| {
            if scope.pinned_item_ids(group) == item_ids {
                return false;
            }
            let count = item_ids.len() as i64;
            scope.set_pinned_item_ids(group, item_ids);
            if group.is_root() && count <= i64::from(limits_config(scope).max_pinned_root) {
                scope.request_pinned_sync(group);
            }
            true
        })
        .await
}

/// Current pinned list for `group`, most-recently-pinned first.
pub async fn pinned_item_ids<S: RecordStore>(
    store: &S,
    group: PeerGroupId,
) -> Result<Vec<PinnedItemId>, StoreError> {
    store.transaction(move |scope| scope.pinned_item_ids(group)).await
}
