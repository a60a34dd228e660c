//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Service version reported by `/`
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Response body for the root endpoint (GET /)
#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub cache: CacheStats,
}

impl RootResponse {
    pub fn new(cache: CacheStats) -> Self {
        Self {
            message: "Gateway OK".to_string(),
            version: APP_VERSION.to_string(),
            cache,
        }
    }
}

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// TTL applied, in seconds
    pub ttl: u64,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>, ttl: u64) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
            ttl,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub cache: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(cache: CacheStats) -> Self {
        let hit_rate = cache.hit_rate();
        Self { cache, hit_rate }
    }
}

/// Response body for the health endpoint (GET|HEAD /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub cache: CacheStats,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn ok(cache: CacheStats) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache,
        }
    }
}
