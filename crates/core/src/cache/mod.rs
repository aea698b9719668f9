//! Batch cache records and the cursor components built on them.
//!
//! One generic cache-record manager, two configurations: the curated feed
//! (24h TTL, calendar-day bound, tied to a user) and the trending feed
//! (1h TTL, not user-specific). Both persist a single whole record per feed
//! and expose a stable, resumable cursor over its items.

mod batch;
mod curated;
mod record;

pub use batch::BatchCache;
pub use curated::CuratedBatchCache;
pub use record::{BatchRecord, ValidityPolicy};

/// Whether the daily batch-generation quota is used up.
///
/// The caches never refuse to fetch; callers compare the externally
/// reported count against the limit before invoking the generation path.
pub fn quota_exhausted(count: u32, limit: u32) -> bool {
    count >= limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_boundary() {
        assert!(!quota_exhausted(9, 10));
        assert!(quota_exhausted(10, 10));
        assert!(quota_exhausted(11, 10));
    }
}
