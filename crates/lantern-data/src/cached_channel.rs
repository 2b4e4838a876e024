//! Cached auxiliary state for a channel-like conversation.
//!
//! The entity is replaced wholesale: the decode path rebuilds it from its
//! record on load, and field changes go through
//! [`CachedChannelState::with`], which copies the value with a sparse set of
//! changes applied. The referenced-peer and referenced-message indices are
//! computed from the stored fields on read and never persisted.
//!
//! Record keys are bit-exact with the data already on disk; do not rename
//! them.

use std::any::Any;
use std::collections::BTreeSet;
use std::ops::BitOr;

use lantern_record::{MessageId, PeerId, Record, RecordEntity};

/// Capability bits advertised by the server for a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelCapabilities(u32);

impl ChannelCapabilities {
    pub const CAN_DISPLAY_PARTICIPANTS: Self = Self(1 << 0);
    pub const CAN_CHANGE_USERNAME: Self = Self(1 << 1);
    pub const CAN_SET_STICKER_SET: Self = Self(1 << 2);
    pub const PRE_HISTORY_ENABLED: Self = Self(1 << 3);
    pub const CAN_VIEW_STATS: Self = Self(1 << 4);

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn from_raw(raw: i32) -> Self {
        Self(raw as u32)
    }

    pub fn to_raw(self) -> i32 {
        self.0 as i32
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ChannelCapabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Whether the user may report this channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportStatus {
    #[default]
    Unknown,
    CanReport,
    Dismissed,
}

impl ReportStatus {
    fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::CanReport,
            2 => Self::Dismissed,
            _ => Self::Unknown,
        }
    }

    fn to_raw(self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::CanReport => 1,
            Self::Dismissed => 2,
        }
    }
}

/// Participant-count summary. Each count is independently optional and
/// occupies its own presence-tagged slot; a slot missing from the record
/// decodes to `None`, never to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipantCounts {
    pub members: Option<i32>,
    pub admins: Option<i32>,
    pub banned: Option<i32>,
    pub kicked: Option<i32>,
}

impl ParticipantCounts {
    // Encoded flat into the parent entity's record, not as a nested record.
    fn encode_into(self, record: &mut Record) {
        record.set_opt_i32("p.m", self.members);
        record.set_opt_i32("p.a", self.admins);
        record.set_opt_i32("p.b", self.banned);
        record.set_opt_i32("p.k", self.kicked);
    }

    fn decode_from(record: &Record) -> Self {
        Self {
            members: record.opt_i32("p.m"),
            admins: record.opt_i32("p.a"),
            banned: record.opt_i32("p.b"),
            kicked: record.opt_i32("p.k"),
        }
    }
}

/// Invitation link exported for this channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteLink {
    pub url: String,
}

impl RecordEntity for InviteLink {
    fn encode(&self) -> Record {
        let mut record = Record::new();
        record.set_string("url", &self.url);
        record
    }

    fn decode(record: &Record) -> Self {
        Self {
            url: record.get_str("url", ""),
        }
    }
}

/// Reference to a bot participating in the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotMember {
    pub peer_id: PeerId,
}

impl RecordEntity for BotMember {
    fn encode(&self) -> Record {
        let mut record = Record::new();
        record.set_i64("p", self.peer_id.to_i64());
        record
    }

    fn decode(record: &Record) -> Self {
        Self {
            peer_id: PeerId::from_i64(record.get_i64("p", 0)),
        }
    }
}

/// Reference to the sticker collection associated with the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickerSetRef {
    pub id: i64,
    pub title: String,
}

impl RecordEntity for StickerSetRef {
    fn encode(&self) -> Record {
        let mut record = Record::new();
        record.set_i64("id", self.id);
        record.set_string("t", &self.title);
        record
    }

    fn decode(record: &Record) -> Self {
        Self {
            id: record.get_i64("id", 0),
            title: record.get_str("t", ""),
        }
    }
}

/// The message boundary at which a basic group's history ends and this
/// channel's begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationBoundary {
    pub message_id: MessageId,
}

impl RecordEntity for MigrationBoundary {
    fn encode(&self) -> Record {
        let mut record = Record::new();
        record.set_i64("p", self.message_id.peer_id.to_i64());
        record.set_i32("n", self.message_id.namespace);
        record.set_i32("i", self.message_id.id);
        record
    }

    fn decode(record: &Record) -> Self {
        Self {
            message_id: MessageId::new(
                PeerId::from_i64(record.get_i64("p", 0)),
                record.get_i32("n", 0),
                record.get_i32("i", 0),
            ),
        }
    }
}

/// Capability shared by every cached per-peer entity kind.
///
/// `is_equal` is type-tagged: values of different concrete kinds always
/// compare unequal; values of the same kind compare structurally.
pub trait CachedPeerData: Any {
    fn as_any(&self) -> &dyn Any;
    fn is_equal(&self, other: &dyn CachedPeerData) -> bool;
}

/// Last known auxiliary state of one channel-like conversation.
///
/// A plain value type: every field change produces a new value via
/// [`with`](Self::with); nothing mutates in place. The default value is the
/// empty state used on first reference to a conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedChannelState {
    pub is_forbidden: bool,
    pub capabilities: ChannelCapabilities,
    pub about: Option<String>,
    pub participant_counts: ParticipantCounts,
    pub invite: Option<InviteLink>,
    pub bot_members: Vec<BotMember>,
    pub report_status: ReportStatus,
    pub pinned_message_id: Option<MessageId>,
    pub sticker_set: Option<StickerSetRef>,
    pub min_available_message_id: Option<MessageId>,
    pub migration: Option<MigrationBoundary>,
    pub linked_discussion_peer_id: Option<PeerId>,
}

/// Sparse field changes for [`CachedChannelState::with`].
///
/// `Some(change)` applies the change, `None` keeps the current value.
/// Optional entity fields use a nested `Option`: `Some(None)` clears the
/// field, `Some(Some(v))` replaces it.
#[derive(Debug, Clone, Default)]
pub struct CachedChannelUpdate {
    pub is_forbidden: Option<bool>,
    pub capabilities: Option<ChannelCapabilities>,
    pub about: Option<Option<String>>,
    pub participant_counts: Option<ParticipantCounts>,
    pub invite: Option<Option<InviteLink>>,
    pub bot_members: Option<Vec<BotMember>>,
    pub report_status: Option<ReportStatus>,
    pub pinned_message_id: Option<Option<MessageId>>,
    pub sticker_set: Option<Option<StickerSetRef>>,
    pub min_available_message_id: Option<Option<MessageId>>,
    pub migration: Option<Option<MigrationBoundary>>,
    pub linked_discussion_peer_id: Option<Option<PeerId>>,
}

impl CachedChannelState {
    /// Copy of this state with the update's changes applied.
    pub fn with(&self, update: CachedChannelUpdate) -> Self {
        let mut next = self.clone();
        if let Some(is_forbidden) = update.is_forbidden {
            next.is_forbidden = is_forbidden;
        }
        if let Some(capabilities) = update.capabilities {
            next.capabilities = capabilities;
        }
        if let Some(about) = update.about {
            next.about = about;
        }
        if let Some(participant_counts) = update.participant_counts {
            next.participant_counts = participant_counts;
        }
        if let Some(invite) = update.invite {
            next.invite = invite;
        }
        if let Some(bot_members) = update.bot_members {
            next.bot_members = bot_members;
        }
        if let Some(report_status) = update.report_status {
            next.report_status = report_status;
        }
        if let Some(pinned_message_id) = update.pinned_message_id {
            next.pinned_message_id = pinned_message_id;
        }
        if let Some(sticker_set) = update.sticker_set {
            next.sticker_set = sticker_set;
        }
        if let Some(min_available_message_id) = update.min_available_message_id {
            next.min_available_message_id = min_available_message_id;
        }
        if let Some(migration) = update.migration {
            next.migration = migration;
        }
        if let Some(linked_discussion_peer_id) = update.linked_discussion_peer_id {
            next.linked_discussion_peer_id = linked_discussion_peer_id;
        }
        next
    }

    /// Peers referenced by this state: bot members plus the linked
    /// discussion peer.
    pub fn peer_ids(&self) -> BTreeSet<PeerId> {
        let mut peer_ids: BTreeSet<PeerId> =
            self.bot_members.iter().map(|bot| bot.peer_id).collect();
        if let Some(linked) = self.linked_discussion_peer_id {
            peer_ids.insert(linked);
        }
        peer_ids
    }

    /// Messages referenced by this state: the pinned message, if any.
    pub fn message_ids(&self) -> BTreeSet<MessageId> {
        self.pinned_message_id.into_iter().collect()
    }

    /// History continues before this entity at the migration boundary.
    pub fn associated_history_message_id(&self) -> Option<MessageId> {
        self.migration.map(|m| m.message_id)
    }
}

impl RecordEntity for CachedChannelState {
    fn encode(&self) -> Record {
        let mut record = Record::new();
        record.set_bool("isNotAccessible", self.is_forbidden);
        record.set_i32("f", self.capabilities.to_raw());
        record.set_opt_string("a", self.about.as_deref());
        self.participant_counts.encode_into(&mut record);
        record.set_opt_record("i", self.invite.as_ref().map(RecordEntity::encode));
        record.set_array(
            "b",
            self.bot_members.iter().map(RecordEntity::encode).collect(),
        );
        record.set_i32("r", self.report_status.to_raw());
        set_opt_message_id(&mut record, ["pm.p", "pm.n", "pm.i"], self.pinned_message_id);
        record.set_opt_record("sp", self.sticker_set.as_ref().map(RecordEntity::encode));
        set_opt_message_id(
            &mut record,
            ["ma.p", "ma.n", "ma.i"],
            self.min_available_message_id,
        );
        record.set_opt_record("mr", self.migration.as_ref().map(RecordEntity::encode));
        record.set_opt_i64(
            "dgi",
            self.linked_discussion_peer_id.map(PeerId::to_i64),
        );
        record
    }

    fn decode(record: &Record) -> Self {
        Self {
            is_forbidden: record.get_bool("isNotAccessible", false),
            capabilities: ChannelCapabilities::from_raw(record.get_i32("f", 0)),
            about: record.opt_str("a").map(ToOwned::to_owned),
            participant_counts: ParticipantCounts::decode_from(record),
            invite: record.get_record("i").map(InviteLink::decode),
            bot_members: record.get_array("b").iter().map(BotMember::decode).collect(),
            report_status: ReportStatus::from_raw(record.get_i32("r", 0)),
            pinned_message_id: opt_message_id(record, ["pm.p", "pm.n", "pm.i"]),
            sticker_set: record.get_record("sp").map(StickerSetRef::decode),
            min_available_message_id: opt_message_id(record, ["ma.p", "ma.n", "ma.i"]),
            migration: record.get_record("mr").map(MigrationBoundary::decode),
            linked_discussion_peer_id: record.opt_i64("dgi").map(PeerId::from_i64),
        }
    }
}

impl CachedPeerData for CachedChannelState {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_equal(&self, other: &dyn CachedPeerData) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| other == self)
    }
}

/// Write a message id across its three-key group, or a nil marker for every
/// key when absent — decoders probe any one key and must see a consistent
/// answer.
fn set_opt_message_id(record: &mut Record, group: [&str; 3], message_id: Option<MessageId>) {
    match message_id {
        Some(message_id) => {
            record.set_i64(group[0], message_id.peer_id.to_i64());
            record.set_i32(group[1], message_id.namespace);
            record.set_i32(group[2], message_id.id);
        }
        None => {
            for key in group {
                record.set_nil(key);
            }
        }
    }
}

/// A message-id key group is present only if every key decodes; partial
/// presence reads as absent.
fn opt_message_id(record: &Record, group: [&str; 3]) -> Option<MessageId> {
    let peer_id = record.opt_i64(group[0])?;
    let namespace = record.opt_i32(group[1])?;
    let id = record.opt_i32(group[2])?;
    Some(MessageId::new(PeerId::from_i64(peer_id), namespace, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_record::{message_namespace, peer_namespace};

    fn channel_peer(id: i32) -> PeerId {
        PeerId::new(peer_namespace::CHANNEL, id)
    }

    fn populated_state() -> CachedChannelState {
        let peer = channel_peer(100);
        CachedChannelState {
            is_forbidden: true,
            capabilities: ChannelCapabilities::CAN_DISPLAY_PARTICIPANTS
                | ChannelCapabilities::CAN_VIEW_STATS,
            about: Some("all about lanterns".to_owned()),
            participant_counts: ParticipantCounts {
                members: Some(250),
                admins: Some(3),
                banned: None,
                kicked: Some(0),
            },
            invite: Some(InviteLink {
                url: "https://lantern.chat/join/abc".to_owned(),
            }),
            bot_members: vec![
                BotMember {
                    peer_id: PeerId::new(peer_namespace::USER, 7),
                },
                BotMember {
                    peer_id: PeerId::new(peer_namespace::USER, 8),
                },
            ],
            report_status: ReportStatus::CanReport,
            pinned_message_id: Some(MessageId::new(peer, message_namespace::CLOUD, 55)),
            sticker_set: Some(StickerSetRef {
                id: 900,
                title: "Fireflies".to_owned(),
            }),
            min_available_message_id: Some(MessageId::new(peer, message_namespace::CLOUD, 10)),
            migration: Some(MigrationBoundary {
                message_id: MessageId::new(
                    PeerId::new(peer_namespace::GROUP, 44),
                    message_namespace::CLOUD,
                    1200,
                ),
            }),
            linked_discussion_peer_id: Some(channel_peer(101)),
        }
    }

    #[test]
    fn round_trip_with_all_optionals_present() {
        let state = populated_state();
        let decoded = CachedChannelState::decode(&state.encode());
        assert_eq!(decoded, state);
        assert!(state.is_equal(&decoded));
    }

    #[test]
    fn round_trip_with_all_optionals_absent() {
        let state = CachedChannelState::default();
        let record = state.encode();
        // Every key group is written even when absent.
        assert!(record.contains_key("a"));
        assert!(record.contains_key("pm.p"));
        assert!(record.contains_key("pm.n"));
        assert!(record.contains_key("pm.i"));
        assert!(record.contains_key("dgi"));

        let decoded = CachedChannelState::decode(&record);
        assert_eq!(decoded, state);
    }

    #[test]
    fn decode_of_empty_record_is_default() {
        assert_eq!(
            CachedChannelState::decode(&Record::new()),
            CachedChannelState::default()
        );
    }

    #[test]
    fn partial_message_id_group_decodes_as_absent() {
        let mut record = populated_state().encode();
        record.set_nil("pm.n");
        let decoded = CachedChannelState::decode(&record);
        assert_eq!(decoded.pinned_message_id, None);
        assert!(decoded.message_ids().is_empty());
    }

    #[test]
    fn absent_participant_counts_decode_to_none_not_zero() {
        let record = CachedChannelState::default().encode();
        let decoded = CachedChannelState::decode(&record);
        assert_eq!(decoded.participant_counts.members, None);
        assert_eq!(decoded.participant_counts.banned, None);
    }

    #[test]
    fn peer_index_is_union_of_bots_and_linked_discussion() {
        let mut state = populated_state();
        let expected: BTreeSet<PeerId> = [
            PeerId::new(peer_namespace::USER, 7),
            PeerId::new(peer_namespace::USER, 8),
            channel_peer(101),
        ]
        .into_iter()
        .collect();
        assert_eq!(state.peer_ids(), expected);

        // Clearing the linked discussion drops it from the index.
        state = state.with(CachedChannelUpdate {
            linked_discussion_peer_id: Some(None),
            ..Default::default()
        });
        let bots_only: BTreeSet<PeerId> = [
            PeerId::new(peer_namespace::USER, 7),
            PeerId::new(peer_namespace::USER, 8),
        ]
        .into_iter()
        .collect();
        assert_eq!(state.peer_ids(), bots_only);

        // Replacing the bot list rebuilds the index.
        state = state.with(CachedChannelUpdate {
            bot_members: Some(vec![BotMember {
                peer_id: PeerId::new(peer_namespace::USER, 99),
            }]),
            ..Default::default()
        });
        let replaced: BTreeSet<PeerId> =
            [PeerId::new(peer_namespace::USER, 99)].into_iter().collect();
        assert_eq!(state.peer_ids(), replaced);
    }

    #[test]
    fn message_index_tracks_the_pinned_message() {
        let state = populated_state();
        assert_eq!(
            state.message_ids().into_iter().collect::<Vec<_>>(),
            vec![state.pinned_message_id.unwrap()]
        );

        let unpinned = state.with(CachedChannelUpdate {
            pinned_message_id: Some(None),
            ..Default::default()
        });
        assert!(unpinned.message_ids().is_empty());
    }

    #[test]
    fn about_update_changes_nothing_else() {
        let state = populated_state();
        let updated = state.with(CachedChannelUpdate {
            about: Some(Some("new about".to_owned())),
            ..Default::default()
        });

        assert_eq!(updated.about.as_deref(), Some("new about"));
        let reverted = updated.with(CachedChannelUpdate {
            about: Some(state.about.clone()),
            ..Default::default()
        });
        assert_eq!(reverted, state);
        assert_eq!(updated.peer_ids(), state.peer_ids());
        assert_eq!(updated.message_ids(), state.message_ids());
    }

    #[test]
    fn empty_update_is_identity() {
        let state = populated_state();
        assert_eq!(state.with(CachedChannelUpdate::default()), state);
    }

    #[test]
    fn migration_boundary_is_the_associated_history_anchor() {
        let state = populated_state();
        assert_eq!(
            state.associated_history_message_id(),
            state.migration.map(|m| m.message_id)
        );
        assert_eq!(
            CachedChannelState::default().associated_history_message_id(),
            None
        );
    }

    #[test]
    fn is_equal_rejects_other_entity_kinds() {
        struct CachedUserState;

        impl CachedPeerData for CachedUserState {
            fn as_any(&self) -> &dyn Any {
                self
            }

            fn is_equal(&self, other: &dyn CachedPeerData) -> bool {
                other.as_any().downcast_ref::<Self>().is_some()
            }
        }

        let state = populated_state();
        assert!(!state.is_equal(&CachedUserState));
        assert!(state.is_equal(&state.clone()));
    }

    #[test]
    fn capability_bits_compose() {
        let caps = ChannelCapabilities::CAN_SET_STICKER_SET | ChannelCapabilities::CAN_VIEW_STATS;
        assert!(caps.contains(ChannelCapabilities::CAN_VIEW_STATS));
        assert!(!caps.contains(ChannelCapabilities::CAN_CHANGE_USERNAME));
        assert_eq!(ChannelCapabilities::from_raw(caps.to_raw()), caps);
        assert_eq!(ChannelCapabilities::empty(), ChannelCapabilities::default());
    }

    #[test]
    fn unknown_report_status_decodes_to_unknown() {
        let mut record = Record::new();
        record.set_i32("r", 250);
        assert_eq!(
            CachedChannelState::decode(&record).report_status,
            ReportStatus::Unknown
        );
    }
}
