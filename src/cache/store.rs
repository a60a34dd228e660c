//! Cache Store Module
//!
//! Main cache engine: a key/entry map with TTL expiry and soonest-expiry
//! capacity eviction.
//!
//! # Concurrency
//! All map access goes through a single mutex. Every critical section is
//! bounded: `get`/`set` are O(1) amortised apart from the occasional
//! eviction batch, and reclaim removes expired keys in fixed-size chunks so
//! callers never wait on a full sweep.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::cache::eviction;
use crate::cache::stats::Counters;
use crate::cache::{CacheEntry, CacheStats, MAX_TTL};
use crate::clock::{SharedClock, SystemClock};
use crate::error::{Error, Result};

/// Keys removed per lock acquisition during reclaim.
pub const RECLAIM_CHUNK: usize = 256;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    counters: Counters,
}

// == Cache Store ==
/// Shared in-process cache with TTL expiry and bounded size.
///
/// Construct once and share by `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct CacheStore {
    inner: Mutex<Inner>,
    clock: SharedClock,
    /// Maximum number of entries allowed
    capacity: usize,
    /// TTL used by `set_default`
    default_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore backed by the system clock.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries the cache can hold
    /// * `default_ttl` - TTL applied by `set_default`
    pub fn new(capacity: usize, default_ttl: Duration) -> Result<Self> {
        Self::with_clock(capacity, default_ttl, SystemClock::shared())
    }

    /// Creates a new CacheStore reading time from `clock`.
    pub fn with_clock(capacity: usize, default_ttl: Duration, clock: SharedClock) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfig(
                "cache capacity must be positive".to_string(),
            ));
        }
        if default_ttl.is_zero() {
            return Err(Error::InvalidConfig(
                "default ttl must be positive".to_string(),
            ));
        }
        if default_ttl > MAX_TTL {
            return Err(Error::InvalidConfig(format!(
                "default ttl must not exceed {} seconds",
                MAX_TTL.as_secs()
            )));
        }

        Ok(Self {
            inner: Mutex::new(Inner::default()),
            clock,
            capacity,
            default_ttl,
        })
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` if the key is absent or expired. An expired entry is
    /// removed on the way out.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = self.clock.now();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let expired = match inner.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                inner.counters.record_hit();
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.entries.remove(key);
        }
        inner.counters.record_miss();
        None
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`, replacing any existing entry.
    ///
    /// If the store already holds `capacity` entries, the
    /// `ceil(capacity / 10)` entries closest to expiry are evicted first,
    /// even when `key` is already present. `ttl` is trusted to be positive
    /// and is clamped to [`MAX_TTL`].
    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let key = key.into();
        let now = self.clock.now();
        let entry = CacheEntry::new(value, now, ttl);
        let mut inner = self.inner.lock();

        if inner.entries.len() >= self.capacity {
            let victims =
                eviction::soonest_expiring(&inner.entries, eviction::batch_size(self.capacity));
            for victim in &victims {
                inner.entries.remove(victim);
            }
            inner.counters.record_evictions(victims.len());
            debug!(
                evicted = victims.len(),
                capacity = self.capacity,
                "Cache full, evicted soonest-expiring entries"
            );
        }

        inner.entries.insert(key, entry);
    }

    /// Stores `value` under `key` with the configured default TTL.
    pub fn set_default(&self, key: impl Into<String>, value: Value) {
        self.set(key, value, self.default_ttl);
    }

    // == Stats ==
    /// Returns current cache statistics.
    ///
    /// `live_entries` is computed by a read-only scan; expired entries are
    /// counted but not removed. An entry stops being live at its expiry
    /// instant, the same boundary `get` uses.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let inner = self.inner.lock();
        let live_entries = inner
            .entries
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count();

        CacheStats {
            total_entries: inner.entries.len(),
            live_entries,
            capacity: self.capacity,
            default_ttl: self.default_ttl.as_secs(),
            hits: inner.counters.hits,
            misses: inner.counters.misses,
            evictions: inner.counters.evictions,
            reclaimed: inner.counters.reclaimed,
        }
    }

    // == Reclaim Expired ==
    /// Removes all entries expired at the time of the call.
    ///
    /// Expired keys are snapshotted first, then deleted in chunks of
    /// [`RECLAIM_CHUNK`], re-checking expiry so an entry refreshed in the
    /// meantime survives. Returns the number of entries removed.
    pub fn reclaim_expired(&self) -> usize {
        let now = self.clock.now();
        let expired_keys: Vec<String> = {
            let inner = self.inner.lock();
            inner
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_expired_at(now))
                .map(|(key, _)| key.clone())
                .collect()
        };

        let mut removed = 0;
        for chunk in expired_keys.chunks(RECLAIM_CHUNK) {
            let mut inner = self.inner.lock();
            let mut chunk_removed = 0;
            for key in chunk {
                let still_expired = inner
                    .entries
                    .get(key)
                    .is_some_and(|entry| entry.is_expired_at(now));
                if still_expired {
                    inner.entries.remove(key);
                    chunk_removed += 1;
                }
            }
            inner.counters.record_reclaimed(chunk_removed);
            removed += chunk_removed;
        }

        removed
    }

    // == Accessors ==
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}
