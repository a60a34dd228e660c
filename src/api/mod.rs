//! API Module
//!
//! HTTP handlers, admission middleware and routing for the gateway.
//!
//! # Endpoints
//! - `GET /` - Version and cache statistics
//! - `PUT /set` - Store a JSON value
//! - `GET /get/:key` - Retrieve a value by key
//! - `GET /stats` - Get cache statistics
//! - `GET|HEAD /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use middleware::admission_middleware;
pub use routes::create_router;
