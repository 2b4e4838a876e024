//! Identifier types shared between the store interface and the entities.

use serde::{Deserialize, Serialize};

/// Namespace half of a [`PeerId`].
pub mod peer_namespace {
    pub const USER: i32 = 0;
    pub const GROUP: i32 = 1;
    pub const CHANNEL: i32 = 2;
    pub const SECRET_CHAT: i32 = 3;
}

/// Namespace of a [`MessageId`] within its conversation.
pub mod message_namespace {
    pub const CLOUD: i32 = 0;
    pub const LOCAL: i32 = 1;
}

/// Chat-list group ids reserved for the built-in groupings (main list and
/// archive). User-defined folder ids must land outside this set.
pub const BUILTIN_GROUP_IDS: [i32; 2] = [0, 1];

/// Opaque conversation identifier packing `namespace << 32 | id`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PeerId(i64);

impl PeerId {
    pub fn new(namespace: i32, id: i32) -> Self {
        Self((i64::from(namespace) << 32) | i64::from(id as u32))
    }

    pub fn namespace(self) -> i32 {
        (self.0 >> 32) as i32
    }

    pub fn id(self) -> i32 {
        (self.0 & 0xffff_ffff) as i32
    }

    pub fn to_i64(self) -> i64 {
        self.0
    }

    pub fn from_i64(raw: i64) -> Self {
        Self(raw)
    }
}

/// Identifier of one message: the conversation it belongs to, a namespace,
/// and a sequence number within that namespace.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MessageId {
    pub peer_id: PeerId,
    pub namespace: i32,
    pub id: i32,
}

impl MessageId {
    pub fn new(peer_id: PeerId, namespace: i32, id: i32) -> Self {
        Self {
            peer_id,
            namespace,
            id,
        }
    }
}

/// A chat-list grouping: the main list, the archive, or a user-defined
/// folder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PeerGroupId(pub i32);

impl PeerGroupId {
    pub const ROOT: Self = Self(0);
    pub const ARCHIVE: Self = Self(1);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

/// One entry in a group's pinned list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinnedItemId {
    Peer(PeerId),
}

impl PinnedItemId {
    pub fn peer_id(self) -> PeerId {
        match self {
            Self::Peer(peer_id) => peer_id,
        }
    }

    /// Secret-chat pins count against their own capacity bucket.
    pub fn is_secret(self) -> bool {
        self.peer_id().namespace() == peer_namespace::SECRET_CHAT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_id_packs_namespace_and_id() {
        let peer = PeerId::new(peer_namespace::CHANNEL, 1234);
        assert_eq!(peer.namespace(), peer_namespace::CHANNEL);
        assert_eq!(peer.id(), 1234);
        assert_eq!(PeerId::from_i64(peer.to_i64()), peer);
    }

    #[test]
    fn peer_id_survives_negative_local_ids() {
        let peer = PeerId::new(peer_namespace::USER, -5);
        assert_eq!(peer.namespace(), peer_namespace::USER);
        assert_eq!(peer.id(), -5);
    }

    #[test]
    fn secret_chat_pins_are_classified() {
        let secret = PinnedItemId::Peer(PeerId::new(peer_namespace::SECRET_CHAT, 9));
        let regular = PinnedItemId::Peer(PeerId::new(peer_namespace::USER, 9));
        assert!(secret.is_secret());
        assert!(!regular.is_secret());
    }

    #[test]
    fn root_group_is_distinguished() {
        assert!(PeerGroupId::ROOT.is_root());
        assert!(!PeerGroupId::ARCHIVE.is_root());
        assert!(!PeerGroupId(77).is_root());
    }
}
