//! Preference entities read by the list managers.

use lantern_record::{get_preferences_entity, keys, Record, RecordEntity, StoreScope};

/// Server-supplied capacity limits.
///
/// Defaults apply whenever the preference record (or an individual key) is
/// absent — a fresh profile has never received a limits update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitsConfig {
    pub max_pinned_root: i32,
    pub max_pinned_archived: i32,
}

impl LimitsConfig {
    pub const DEFAULT_MAX_PINNED_ROOT: i32 = 5;
    pub const DEFAULT_MAX_PINNED_ARCHIVED: i32 = 100;

    /// Pinned capacity for a chat-list group: the root list has its own
    /// limit, every other group uses the archived limit.
    pub fn max_pinned(self, root: bool) -> i32 {
        if root {
            self.max_pinned_root
        } else {
            self.max_pinned_archived
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pinned_root: Self::DEFAULT_MAX_PINNED_ROOT,
            max_pinned_archived: Self::DEFAULT_MAX_PINNED_ARCHIVED,
        }
    }
}

impl RecordEntity for LimitsConfig {
    fn encode(&self) -> Record {
        let mut record = Record::new();
        record.set_i32("lim.pin", self.max_pinned_root);
        record.set_i32("lim.pinArch", self.max_pinned_archived);
        record
    }

    fn decode(record: &Record) -> Self {
        Self {
            max_pinned_root: record.get_i32("lim.pin", Self::DEFAULT_MAX_PINNED_ROOT),
            max_pinned_archived: record
                .get_i32("lim.pinArch", Self::DEFAULT_MAX_PINNED_ARCHIVED),
        }
    }
}

/// Read the limits configuration inside a scope, falling back to defaults.
pub fn limits_config(scope: &dyn StoreScope) -> LimitsConfig {
    get_preferences_entity(scope, keys::LIMITS).unwrap_or_default()
}

/// URL of the support chat opened from settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportUrlSettings {
    pub url: String,
}

impl RecordEntity for SupportUrlSettings {
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
