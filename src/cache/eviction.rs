//! Eviction Module
//!
//! Capacity eviction by soonest expiry. Shorter TTLs are given to more
//! volatile data, so evicting the entries closest to expiring approximates
//! LRU without tracking access recency.

use std::collections::HashMap;

use crate::cache::CacheEntry;

// == Eviction Batch Size ==
/// Number of entries removed when the store is full: `ceil(capacity / 10)`.
pub fn batch_size(capacity: usize) -> usize {
    capacity.div_ceil(10).max(1)
}

// == Soonest Expiring ==
/// Returns up to `count` keys with the earliest `expires_at`.
///
/// Ties are broken by whatever order the partition leaves them in.
pub fn soonest_expiring(entries: &HashMap<String, CacheEntry>, count: usize) -> Vec<String> {
    if count == 0 || entries.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<(&String, &CacheEntry)> = entries.iter().collect();
    if count < candidates.len() {
        candidates.select_nth_unstable_by_key(count - 1, |(_, entry)| entry.expires_at);
        candidates.truncate(count);
    }

    candidates.into_iter().map(|(key, _)| key.clone()).collect()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{Duration, Instant};

    fn entries_with_ttls(ttls: &[(&str, u64)]) -> HashMap<String, CacheEntry> {
        let now = Instant::now();
        ttls.iter()
            .map(|(key, ttl)| {
                (
                    key.to_string(),
                    CacheEntry::new(json!(key), now, Duration::from_secs(*ttl)),
                )
            })
            .collect()
    }

    #[test]
    fn test_batch_size_rounds_up() {
        assert_eq!(batch_size(1), 1);
        assert_eq!(batch_size(3), 1);
        assert_eq!(batch_size(10), 1);
        assert_eq!(batch_size(11), 2);
        assert_eq!(batch_size(800), 80);
        assert_eq!(batch_size(801), 81);
    }

    #[test]
    fn test_soonest_expiring_picks_earliest() {
        let entries = entries_with_ttls(&[("a", 50), ("b", 10), ("c", 30), ("d", 20)]);

        let mut victims = soonest_expiring(&entries, 2);
        victims.sort();

        assert_eq!(victims, vec!["b".to_string(), "d".to_string()]);
    }

    #[test]
    fn test_soonest_expiring_count_exceeds_len() {
        let entries = entries_with_ttls(&[("a", 5), ("b", 6)]);

        let victims = soonest_expiring(&entries, 10);
        assert_eq!(victims.len(), 2);
    }

    #[test]
    fn test_soonest_expiring_empty() {
        let entries = HashMap::new();
        assert!(soonest_expiring(&entries, 3).is_empty());

        let entries = entries_with_ttls(&[("a", 5)]);
        assert!(soonest_expiring(&entries, 0).is_empty());
    }
}
