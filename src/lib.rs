//! Tube Gateway - request gateway core
//!
//! A shared in-process cache with TTL expiry and soonest-expiry eviction,
//! and a per-client token-bucket admission controller, served behind a thin
//! HTTP surface.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStats, CacheStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use limiter::AdmissionController;
pub use tasks::spawn_reclaim_task;
