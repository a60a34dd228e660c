//! Clock Module
//!
//! Monotonic time source shared by the cache and the admission controller.
//! Production code uses [`SystemClock`]; tests drive time with [`ManualClock`].

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

// == Clock Trait ==
/// Source of monotonic instants.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Shared clock handle injected into the cores.
pub type SharedClock = Arc<dyn Clock>;

// == System Clock ==
/// Wall-independent clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl SystemClock {
    /// Convenience constructor for a shared system clock.
    pub fn shared() -> SharedClock {
        Arc::new(SystemClock)
    }
}

// == Manual Clock ==
/// Clock that only moves when told to.
///
/// Cloning yields a handle to the same underlying time, so a test can keep
/// one clone and hand another to the component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}
