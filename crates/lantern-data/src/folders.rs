//! User-defined chat folders.
//!
//! Folders are stored as one ordered collection per profile; every mutation
//! is a single read-modify-write scope so concurrent calls serialize at the
//! store's transaction boundary instead of overwriting each other.

use std::collections::BTreeSet;

use rand::Rng;

use lantern_record::{
    get_shared_entity, keys, update_shared_entity, PeerGroupId, PeerId, Record, RecordEntity,
    RecordStore, StoreError, BUILTIN_GROUP_IDS,
};

/// A named, ordered grouping of conversations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatFolder {
    pub name: String,
    pub group_id: PeerGroupId,
    pub members: Vec<i64>,
}

impl RecordEntity for ChatFolder {
    fn encode(&self) -> Record {
        let mut record = Record::new();
        record.set_string("cf.name", &self.name);
        record.set_i32("cf.group", self.group_id.0);
        record.set_i64_array("cf.members", self.members.clone());
        record
    }

    fn decode(record: &Record) -> Self {
        Self {
            name: record.get_str("cf.name", "Folder"),
            // -1 marks a record written before the group key existed; it can
            // never collide with a generated id.
            group_id: PeerGroupId(record.get_i32("cf.group", -1)),
            members: record.get_i64_array("cf.members").to_vec(),
        }
    }
}

/// The persisted collection of all folders for one profile. Order is
/// significant: two collections with the same folders in a different order
/// are not equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatFolders {
    pub folders: Vec<ChatFolder>,
}

impl RecordEntity for ChatFolders {
    fn encode(&self) -> Record {
        let mut record = Record::new();
        record.set_array(
            "folders",
            self.folders.iter().map(RecordEntity::encode).collect(),
        );
        record
    }

    fn decode(record: &Record) -> Self {
        Self {
            folders: record
                .get_array("folders")
                .iter()
                .map(ChatFolder::decode)
                .collect(),
        }
    }
}

/// Draw a random folder group id outside the built-in chat-list groups.
///
/// The reserved set is two values out of the non-negative i32 space, so the
/// retry loop converges on the first draw in practice.
pub fn generate_folder_group_id() -> PeerGroupId {
    let mut rng = rand::thread_rng();
    loop {
        let raw = (rng.gen::<u32>() & 0x7fff_ffff) as i32;
        if !BUILTIN_GROUP_IDS.contains(&raw) {
            return PeerGroupId(raw);
        }
    }
}

/// Create a folder and append it to the profile's collection.
///
/// Generates a group id when none is supplied and derives a display name
/// from it when none is given. Returns the folder's group id.
pub async fn create_folder<S: RecordStore>(
    store: &S,
    name: Option<&str>,
    member_peers: &[PeerId],
    group_id: Option<PeerGroupId>,
) -> Result<PeerGroupId, StoreError> {
    let group_id = group_id.unwrap_or_else(generate_folder_group_id);
    let name = name.map_or_else(|| format!("F. {}", group_id.0), ToOwned::to_owned);
    let members: Vec<i64> = member_peers.iter().map(|peer| peer.to_i64()).collect();

    store
        .transaction(move |scope| {
            tracing::info!(group_id = group_id.0, name = %name, "creating folder");
            update_shared_entity(scope, keys::CHAT_FOLDERS, |current: Option<ChatFolders>| {
                let mut all = current.unwrap_or_default();
                all.folders.push(ChatFolder {
                    name,
                    group_id,
                    members,
                });
                all
            });
            group_id
        })
        .await
}

/// Remove the first folder with a matching group id. A miss is a no-op, not
/// an error. Members' chat-list inclusion is left untouched.
pub async fn delete_folder<S: RecordStore>(
    store: &S,
    group_id: PeerGroupId,
) -> Result<(), StoreError> {
    store
        .transaction(move |scope| {
            update_shared_entity(scope, keys::CHAT_FOLDERS, |current: Option<ChatFolders>| {
                let mut all = current.unwrap_or_default();
                if let Some(index) = all
                    .folders
                    .iter()
                    .position(|folder| folder.group_id == group_id)
                {
                    all.folders.remove(index);
                    tracing::info!(group_id = group_id.0, "folder deleted");
                }
                all
            });
        })
        .await
}

/// The profile's full folder collection.
pub async fn folders<S: RecordStore>(store: &S) -> Result<ChatFolders, StoreError> {
    store
        .transaction(|scope| {
            get_shared_entity(scope, keys::CHAT_FOLDERS).unwrap_or_default()
        })
        .await
}

/// The first folder with a matching group id.
pub async fn folder<S: RecordStore>(
    store: &S,
    group_id: PeerGroupId,
) -> Result<Option<ChatFolder>, StoreError> {
    store
        .transaction(move |scope| {
            let all: ChatFolders = get_shared_entity(scope, keys::CHAT_FOLDERS).unwrap_or_default();
            all.folders
                .into_iter()
                .find(|folder| folder.group_id == group_id)
        })
        .await
}

/// Remove the given peers from one folder's member list, leaving every
/// other folder untouched. A missing folder is a no-op.
pub async fn remove_folder_members<S: RecordStore>(
    store: &S,
    group_id: PeerGroupId,
    member_peers: &[PeerId],
) -> Result<(), StoreError> {
    let to_remove: BTreeSet<i64> = member_peers.iter().map(|peer| peer.to_i64()).collect();

    store
        .transaction(move |scope| {
            update_shared_entity(scope, keys::CHAT_FOLDERS, |current: Option<ChatFolders>| {
                let mut all = current.unwrap_or_default();
                if let Some(target) = all
                    .folders
                    .iter_mut()
                    .find(|folder| folder.group_id == group_id)
                {
                    tracing::debug!(
                        group_id = group_id.0,
                        count = to_remove.len(),
                        "removing folder members"
                    );
                    target.members.retain(|member| !to_remove.contains(member));
                }
                all
            });
        })
        .await
}

/// The first folder whose member list contains the peer.
pub async fn folder_containing<S: RecordStore>(
    store: &S,
    peer_id: PeerId,
) -> Result<Option<ChatFolder>, StoreError> {
    let raw = peer_id.to_i64();
    store
        .transaction(move |scope| {
            let all: ChatFolders = get_shared_entity(scope, keys::CHAT_FOLDERS).unwrap_or_default();
            all.folders
                .into_iter()
                .find(|folder| folder.members.contains(&raw))
        })
        .await
}

/// Clear the profile's folder collection.
pub async fn reset_folders<S: RecordStore>(store: &S) -> Result<(), StoreError> {
    store
        .transaction(|scope| {
            tracing::info!("resetting folders");
            scope.set_shared_record(keys::CHAT_FOLDERS, ChatFolders::default().encode());
        })
        .await
}
