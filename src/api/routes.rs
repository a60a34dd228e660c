//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_handler, health_handler, root_handler, set_handler, stats_handler, AppState,
};
use super::middleware::admission_middleware;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Version and cache statistics
/// - `PUT /set` - Store a JSON value
/// - `GET /get/:key` - Retrieve a value by key
/// - `GET /stats` - Get cache statistics
/// - `GET|HEAD /health` - Health check endpoint
///
/// # Middleware
/// - Admission: per-client token bucket, 429 on rejection
/// - CORS: Allows any origin
/// - Tracing: Logs all requests, rejected ones included
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admission_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
