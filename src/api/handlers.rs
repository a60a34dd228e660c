//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::limiter::AdmissionController;
use crate::models::{
    GetResponse, HealthResponse, RootResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Both cores carry their own locking, so handlers share them by `Arc`
/// without an outer lock.
#[derive(Clone)]
pub struct AppState {
    /// Shared response cache
    pub cache: Arc<CacheStore>,
    /// Per-client admission control
    pub limiter: Arc<AdmissionController>,
}

impl AppState {
    /// Creates a new AppState from already-built cores.
    pub fn new(cache: CacheStore, limiter: AdmissionController) -> Self {
        Self {
            cache: Arc::new(cache),
            limiter: Arc::new(limiter),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails if the configuration is rejected by either core.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let cache = CacheStore::new(config.cache_capacity, config.default_ttl())?;
        let limiter = AdmissionController::new(config.rate, config.per()?)?;
        Ok(Self::new(cache, limiter))
    }
}

/// Handler for GET /
///
/// Reports service version and cache statistics.
pub async fn root_handler(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse::new(state.cache.stats()))
}

/// Handler for PUT /set
///
/// Stores a JSON value in the cache with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(Error::InvalidRequest(error_msg));
    }

    let ttl = req
        .ttl
        .map(Duration::from_secs)
        .unwrap_or_else(|| state.cache.default_ttl());
    state.cache.set(req.key.clone(), req.value, ttl);

    Ok(Json(SetResponse::new(req.key, ttl.as_secs())))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key) {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(Error::NotFound(key)),
    }
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.cache.stats()))
}

/// Handler for GET|HEAD /health
///
/// Returns health status of the server along with cache statistics.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.cache.stats()))
}
