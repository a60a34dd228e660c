//! Limiter Module
//!
//! Per-identity token-bucket admission control.

mod bucket;
mod controller;


pub use bucket::BucketState;
pub use controller::AdmissionController;
