//! The persisted cache record and its validity rules.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One persisted batch: the sole unit of persistence for a feed.
///
/// Invariant: `0 <= cursor <= items.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord<T, F> {
    pub items: Vec<T>,
    pub cursor: usize,
    pub filters: F,
    /// Owning user; `None` for feeds whose content is not user-specific.
    #[serde(default)]
    pub user: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl<T, F> BatchRecord<T, F> {
    pub fn has_next(&self) -> bool {
        self.cursor < self.items.len()
    }

    pub fn remaining(&self) -> usize {
        self.items.len().saturating_sub(self.cursor)
    }
}

/// When a persisted record is still usable.
///
/// All conditions are evaluated independently; failing any one invalidates
/// the record.
#[derive(Debug, Clone, Copy)]
pub struct ValidityPolicy {
    /// Maximum record age.
    pub ttl: Duration,
    /// Additionally require `created_at` to fall on the same calendar day as
    /// the check, so a record from 23:50 dies at midnight even though it is
    /// well inside the TTL.
    pub same_calendar_day: bool,
    /// Require the record's user to match the requesting user.
    pub bind_to_user: bool,
}

impl ValidityPolicy {
    /// The curated-feed policy: 24h TTL, calendar-day bound, user-bound.
    pub fn curated(ttl_hours: i64) -> Self {
        Self {
            ttl: Duration::hours(ttl_hours),
            same_calendar_day: true,
            bind_to_user: true,
        }
    }

    /// The trending-feed policy: short TTL, no day bound, not user-specific.
    pub fn trending(ttl_minutes: i64) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes),
            same_calendar_day: false,
            bind_to_user: false,
        }
    }

    /// Check a record against the current user, filters, and clock.
    pub fn is_valid<T, F: PartialEq>(
        &self,
        record: &BatchRecord<T, F>,
        user: Option<&str>,
        filters: &F,
        now: DateTime<Utc>,
    ) -> bool {
        if self.bind_to_user && record.user.as_deref() != user {
            return false;
        }
        if self.same_calendar_day && record.created_at.date_naive() != now.date_naive() {
            return false;
        }
        if now - record.created_at >= self.ttl {
            return false;
        }
        record.filters == *filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record_at(created_at: DateTime<Utc>) -> BatchRecord<u32, String> {
        BatchRecord {
            items: vec![1, 2, 3],
            cursor: 0,
            filters: "f".to_string(),
            user: Some("octocat".to_string()),
            created_at,
            last_used_at: created_at,
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_cursor_invariant_helpers() {
        let mut record = record_at(at(2024, 6, 1, 8, 0));
        assert!(record.has_next());
        assert_eq!(record.remaining(), 3);

        record.cursor = 3;
        assert!(!record.has_next());
        assert_eq!(record.remaining(), 0);
    }

    #[test]
    fn test_curated_ttl_boundaries() {
        let policy = ValidityPolicy::curated(24);
        let created = at(2024, 6, 1, 0, 0);
        let record = record_at(created);
        let user = Some("octocat");
        let filters = "f".to_string();

        // Valid at T + 23h59m, invalid at T + 24h01m, same calendar day aside.
        assert!(policy.is_valid(&record, user, &filters, at(2024, 6, 1, 23, 59)));
        assert!(!policy.is_valid(&record, user, &filters, at(2024, 6, 2, 0, 1)));
    }

    #[test]
    fn test_curated_calendar_day_rollover() {
        let policy = ValidityPolicy::curated(24);
        // Created at 23:50; checked at 00:10 next day - well inside the TTL
        // but on a different calendar day.
        let record = record_at(at(2024, 6, 1, 23, 50));
        assert!(!policy.is_valid(&record, Some("octocat"), &"f".to_string(), at(2024, 6, 2, 0, 10)));
    }

    #[test]
    fn test_curated_user_mismatch() {
        let policy = ValidityPolicy::curated(24);
        let record = record_at(at(2024, 6, 1, 8, 0));
        assert!(!policy.is_valid(&record, Some("hubot"), &"f".to_string(), at(2024, 6, 1, 9, 0)));
    }

    #[test]
    fn test_curated_filter_mismatch() {
        let policy = ValidityPolicy::curated(24);
        let record = record_at(at(2024, 6, 1, 8, 0));
        assert!(!policy.is_valid(&record, Some("octocat"), &"g".to_string(), at(2024, 6, 1, 9, 0)));
    }

    #[test]
    fn test_trending_ttl_boundaries() {
        let policy = ValidityPolicy::trending(60);
        let created = at(2024, 6, 1, 23, 30);
        let record = BatchRecord::<u32, String> {
            user: None,
            ..record_at(created)
        };
        let filters = "f".to_string();

        assert!(policy.is_valid(&record, None, &filters, at(2024, 6, 2, 0, 29)));
        assert!(!policy.is_valid(&record, None, &filters, at(2024, 6, 2, 0, 31)));
    }

    #[test]
    fn test_trending_policy_ignores_user() {
        let policy = ValidityPolicy::trending(60);
        let record = record_at(at(2024, 6, 1, 8, 0));
        // Record carries a user but the trending policy does not bind to one.
        assert!(policy.is_valid(&record, None, &"f".to_string(), at(2024, 6, 1, 8, 30)));
    }
}
