//! Reclaim Task
//!
//! Background task that periodically removes expired cache entries, so
//! entries nobody reads again still get freed, and drops limiter buckets
//! that have refilled to capacity.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::limiter::AdmissionController;

/// What a single reclaim pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Expired cache entries removed
    pub expired_entries: usize,
    /// Full limiter buckets dropped
    pub idle_buckets: usize,
}

/// Runs one reclaim pass over the cache and the limiter.
pub fn reclaim_once(cache: &CacheStore, limiter: &AdmissionController) -> ReclaimReport {
    ReclaimReport {
        expired_entries: cache.reclaim_expired(),
        idle_buckets: limiter.prune_idle(),
    }
}

/// Runs one pass, containing any panic so the caller's loop survives it.
fn run_tick(cache: &CacheStore, limiter: &AdmissionController) -> Option<ReclaimReport> {
    match panic::catch_unwind(AssertUnwindSafe(|| reclaim_once(cache, limiter))) {
        Ok(report) => Some(report),
        Err(payload) => {
            warn!(
                reason = panic_message(payload.as_ref()),
                "Reclaim tick abandoned, will retry on next tick"
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// Spawns the reclaim task.
///
/// The task sleeps for `interval` between passes and never exits on its own;
/// a pass that panics is logged and skipped. The returned handle is only
/// needed to abort the task at shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheStore::new(800, Duration::from_secs(600))?);
/// let limiter = Arc::new(AdmissionController::new(60.0, Duration::from_secs(60))?);
/// let handle = spawn_reclaim_task(cache.clone(), limiter.clone(), Duration::from_secs(60));
/// ```
pub fn spawn_reclaim_task(
    cache: Arc<CacheStore>,
    limiter: Arc<AdmissionController>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "Starting reclaim task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(report) = run_tick(&cache, &limiter) else {
                continue;
            };

            if report.expired_entries > 0 || report.idle_buckets > 0 {
                info!(
                    expired_entries = report.expired_entries,
                    idle_buckets = report.idle_buckets,
                    "Reclaim pass removed stale state"
                );
            } else {
                debug!("Reclaim pass found nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    /// Clock that panics on its first `failures` reads.
    #[derive(Debug)]
    struct FlakyClock {
        inner: ManualClock,
        failures: AtomicUsize,
    }

    impl Clock for FlakyClock {
        fn now(&self) -> Instant {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                panic!("clock unavailable");
            }
            self.inner.now()
        }
    }

    fn shared_state(clock: &ManualClock) -> (Arc<CacheStore>, Arc<AdmissionController>) {
        let cache = Arc::new(
            CacheStore::with_clock(100, Duration::from_secs(300), Arc::new(clock.clone()))
                .unwrap(),
        );
        let limiter = Arc::new(
            AdmissionController::with_clock(5.0, Duration::from_secs(5), Arc::new(clock.clone()))
                .unwrap(),
        );
        (cache, limiter)
    }

    #[test]
    fn test_reclaim_once_reports_removals() {
        let clock = ManualClock::new();
        let (cache, limiter) = shared_state(&clock);

        cache.set("expire_soon", json!("value"), Duration::from_secs(1));
        cache.set("long_lived", json!("value"), Duration::from_secs(3600));
        limiter.allow("10.0.0.1");

        clock.advance(Duration::from_secs(2));

        let report = reclaim_once(&cache, &limiter);
        assert_eq!(
            report,
            ReclaimReport {
                expired_entries: 1,
                idle_buckets: 1,
            }
        );
        assert_eq!(cache.len(), 1);
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_run_tick_contains_panic() {
        let manual = ManualClock::new();
        let clock = Arc::new(FlakyClock {
            inner: manual.clone(),
            failures: AtomicUsize::new(0),
        });
        let cache = CacheStore::with_clock(10, Duration::from_secs(300), clock.clone()).unwrap();
        let limiter = AdmissionController::new(5.0, Duration::from_secs(5)).unwrap();

        cache.set("k", json!(1), Duration::from_secs(1));
        manual.advance(Duration::from_secs(2));

        clock.failures.store(1, Ordering::SeqCst);
        assert_eq!(run_tick(&cache, &limiter), None);
        assert_eq!(cache.len(), 1);

        let report = run_tick(&cache, &limiter).expect("second tick should succeed");
        assert_eq!(report.expired_entries, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[tokio::test]
    async fn test_reclaim_task_removes_expired_entries() {
        let clock = ManualClock::new();
        let (cache, limiter) = shared_state(&clock);

        cache.set("expire_soon", json!("value"), Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));

        let handle = spawn_reclaim_task(cache.clone(), limiter, Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(200)).await;

        // Nobody read the entry; the task alone removed it
        assert_eq!(cache.len(), 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_reclaim_task_preserves_valid_entries() {
        let clock = ManualClock::new();
        let (cache, limiter) = shared_state(&clock);

        cache.set("long_lived", json!("value"), Duration::from_secs(3600));

        let handle = spawn_reclaim_task(cache.clone(), limiter, Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get("long_lived"), Some(json!("value")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_reclaim_task_survives_panicking_tick() {
        let manual = ManualClock::new();
        let clock = Arc::new(FlakyClock {
            inner: manual.clone(),
            failures: AtomicUsize::new(0),
        });
        let cache = Arc::new(
            CacheStore::with_clock(10, Duration::from_secs(300), clock.clone()).unwrap(),
        );
        let limiter = Arc::new(AdmissionController::new(5.0, Duration::from_secs(5)).unwrap());

        cache.set("k", json!(1), Duration::from_secs(1));
        manual.advance(Duration::from_secs(2));
        clock.failures.store(2, Ordering::SeqCst);

        let handle = spawn_reclaim_task(cache.clone(), limiter, Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(!handle.is_finished(), "Task must outlive a failed tick");
        assert!(cache.is_empty());

        handle.abort();
    }

    #[tokio::test]
    async fn test_reclaim_task_can_be_aborted() {
        let clock = ManualClock::new();
        let (cache, limiter) = shared_state(&clock);

        let handle = spawn_reclaim_task(cache, limiter, Duration::from_secs(60));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
