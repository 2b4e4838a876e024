pub mod codec;
pub mod error;
pub mod ids;
pub mod memory;
pub mod store;
pub mod value;

pub use codec::RecordEntity;
pub use error::StoreError;
pub use ids::{
    message_namespace, peer_namespace, MessageId, PeerGroupId, PeerId, PinnedItemId,
    BUILTIN_GROUP_IDS,
};
pub use memory::MemoryRecordStore;
pub use store::{
    get_preferences_entity, get_shared_entity, keys, update_shared_entity, PreferencesKey,
    RecordStore, SharedDataKey, StoreScope,
};
pub use value::{Record, RecordValue};
