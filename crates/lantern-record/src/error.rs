use thiserror::Error;

/// Failure surfaced by a record store backend.
///
/// The data layer treats these as opaque: they propagate unchanged to the
/// caller, with no retries and no partial application — the store's own
/// transaction boundary guarantees all-or-nothing per scope.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is closed")]
    Closed,

    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("snapshot serialization failed: {0}")]
    Snapshot(String),
}
