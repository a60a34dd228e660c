//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the process.
//!
//! # Tasks
//! - Reclaim: removes expired cache entries and idle limiter buckets on a
//!   fixed interval, independent of request traffic

mod reclaim;

pub use reclaim::{reclaim_once, spawn_reclaim_task, ReclaimReport};
