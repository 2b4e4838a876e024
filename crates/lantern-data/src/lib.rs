pub mod cached_channel;
pub mod folders;
pub mod pinned;
pub mod settings;

pub use cached_channel::{
    BotMember, CachedChannelState, CachedChannelUpdate, CachedPeerData, ChannelCapabilities,
    InviteLink, MigrationBoundary, ParticipantCounts, ReportStatus, StickerSetRef,
};
pub use folders::{
    create_folder, delete_folder, folder, folder_containing, folders, generate_folder_group_id,
    remove_folder_members, reset_folders, ChatFolder, ChatFolders,
};
pub use pinned::{
    pinned_item_ids, reorder_pinned_items, toggle_item_pinned, PinnedLimitPolicy,
    TogglePinnedResult,
};
pub use settings::{limits_config, LimitsConfig, SupportUrlSettings};
