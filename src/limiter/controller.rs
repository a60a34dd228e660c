//! Admission Controller Module
//!
//! Per-identity token bucket guarding every inbound request.
//!
//! # Concurrency
//! Buckets live in a sharded concurrent map. Each `allow` call holds the
//! shard lock for its identity across the whole refill, compare, consume and
//! persist step, so two calls for one identity are serialised and never
//! spend from the same pre-refill count. Identities on different shards do
//! not contend.

use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;

use crate::clock::{SharedClock, SystemClock};
use crate::error::{Error, Result};
use crate::limiter::BucketState;

// == Admission Controller ==
#[derive(Debug)]
pub struct AdmissionController {
    buckets: DashMap<String, BucketState>,
    clock: SharedClock,
    /// Bucket capacity, the largest burst one identity may send
    rate: f64,
    /// Window over which `rate` tokens regenerate
    per: Duration,
    /// Tokens regained per second: `rate / per`
    refill_per_sec: f64,
}

impl AdmissionController {
    // == Constructor ==
    /// Creates a controller allowing `rate` requests per `per` window per
    /// identity, backed by the system clock.
    pub fn new(rate: f64, per: Duration) -> Result<Self> {
        Self::with_clock(rate, per, SystemClock::shared())
    }

    /// Creates a controller reading time from `clock`.
    pub fn with_clock(rate: f64, per: Duration, clock: SharedClock) -> Result<Self> {
        if !(rate.is_finite() && rate >= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "rate must be at least 1, got {rate}"
            )));
        }
        if per.is_zero() {
            return Err(Error::InvalidConfig(
                "per must be a positive duration".to_string(),
            ));
        }

        Ok(Self {
            buckets: DashMap::new(),
            clock,
            rate,
            per,
            refill_per_sec: rate / per.as_secs_f64(),
        })
    }

    // == Allow ==
    /// Decides whether `identity` may proceed, spending one token if so.
    ///
    /// The first call for an identity always succeeds since its bucket
    /// starts full.
    pub fn allow(&self, identity: &str) -> bool {
        let allowed = match self.buckets.get_mut(identity) {
            Some(mut bucket) => {
                let now = self.clock.now();
                bucket.admit(now, self.rate, self.refill_per_sec)
            }
            None => {
                let mut bucket = self
                    .buckets
                    .entry(identity.to_string())
                    .or_insert_with(|| BucketState::full(self.rate, self.clock.now()));
                let now = self.clock.now();
                bucket.admit(now, self.rate, self.refill_per_sec)
            }
        };

        if !allowed {
            debug!(identity, "Admission rejected");
        }
        allowed
    }

    // == Tokens ==
    /// Tokens `identity` would have right now, or `None` if it has no bucket.
    pub fn tokens(&self, identity: &str) -> Option<f64> {
        let now = self.clock.now();
        self.buckets
            .get(identity)
            .map(|bucket| bucket.refilled(now, self.rate, self.refill_per_sec))
    }

    // == Prune Idle ==
    /// Drops buckets that have refilled to capacity.
    ///
    /// A full bucket behaves exactly like the one `allow` would create for an
    /// unseen identity, so pruning never changes a later decision. Returns
    /// the number of buckets removed.
    pub fn prune_idle(&self) -> usize {
        let mut removed = 0;
        self.buckets.retain(|_, bucket| {
            let now = self.clock.now();
            let idle = bucket.refilled(now, self.rate, self.refill_per_sec) >= self.rate;
            if idle {
                removed += 1;
            }
            !idle
        });
        removed
    }

    // == Accessors ==
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn per(&self) -> Duration {
        self.per
    }

    /// Number of identities currently tracked.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
