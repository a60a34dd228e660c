//! Token Bucket Module
//!
//! Per-identity bucket state and its refill-then-consume step.

use std::time::Instant;

// == Bucket State ==
/// Tokens available to one identity and when they were last refilled.
///
/// Invariant: `0 <= tokens <= rate` after every call to [`BucketState::admit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketState {
    pub tokens: f64,
    pub last_refill_at: Instant,
}

impl BucketState {
    /// A full bucket, as handed to an identity on its first request.
    pub fn full(rate: f64, now: Instant) -> Self {
        Self {
            tokens: rate,
            last_refill_at: now,
        }
    }

    /// Token count at `now` without mutating the bucket.
    pub fn refilled(&self, now: Instant, rate: f64, refill_per_sec: f64) -> f64 {
        let elapsed = now.saturating_duration_since(self.last_refill_at).as_secs_f64();
        (self.tokens + elapsed * refill_per_sec).min(rate)
    }

    // == Admit ==
    /// Refills for the time elapsed since the last call, then spends one
    /// token if available.
    ///
    /// `last_refill_at` moves to `now` whether or not the request is
    /// admitted, so rejected calls never bank elapsed time.
    pub fn admit(&mut self, now: Instant, rate: f64, refill_per_sec: f64) -> bool {
        self.tokens = self.refilled(now, rate, refill_per_sec);
        if now > self.last_refill_at {
            self.last_refill_at = now;
        }

        if self.tokens < 1.0 {
            return false;
        }
        self.tokens -= 1.0;
        true
    }
}
