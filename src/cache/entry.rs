//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use serde_json::Value;

/// Longest lifetime an entry can be given. Longer TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

// == Cache Entry ==
/// A stored value and the instant it stops being served.
///
/// Entries are never mutated in place; `set` on an existing key replaces the
/// whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Instant at which the entry expires
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry expiring `ttl` after `now`, with `ttl` clamped to
    /// [`MAX_TTL`].
    pub fn new(value: Value, now: Instant, ttl: Duration) -> Self {
        let ttl = ttl.min(MAX_TTL);
        Self {
            value,
            expires_at: now.checked_add(ttl).unwrap_or(now),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so
    /// it is never served at or after its expiry instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let now = Instant::now();
        let entry = CacheEntry::new(json!("test_value"), now, Duration::from_secs(60));

        assert_eq!(entry.value, json!("test_value"));
        assert_eq!(entry.expires_at, now + Duration::from_secs(60));
        assert!(!entry.is_expired_at(now));
    }

    #[test]
    fn test_entry_expiration() {
        let now = Instant::now();
        let entry = CacheEntry::new(json!({"a": 1}), now, Duration::from_secs(1));

        assert!(!entry.is_expired_at(now + Duration::from_millis(999)));
        assert!(entry.is_expired_at(now + Duration::from_millis(1100)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry::new(json!(1), now, Duration::from_secs(10));

        // Expired exactly at expires_at
        assert!(entry.is_expired_at(entry.expires_at));
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let now = Instant::now();
        let entry = CacheEntry::new(json!(1), now, Duration::MAX);

        assert_eq!(entry.expires_at, now + MAX_TTL);
        assert!(!entry.is_expired_at(now + MAX_TTL - Duration::from_secs(1)));
    }
}
