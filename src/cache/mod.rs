//! Cache Module
//!
//! Provides the shared in-memory cache with TTL expiration and
//! soonest-expiry capacity eviction.

mod entry;
mod eviction;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, MAX_TTL};
pub use eviction::batch_size as eviction_batch_size;
pub use stats::CacheStats;
pub use store::{CacheStore, RECLAIM_CHUNK};
