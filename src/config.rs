//! Configuration Module
//!
//! Loads gateway configuration from environment variables. The cache and the
//! admission controller never read the environment; they receive these values
//! through their constructors.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::MAX_TTL;
use crate::error::{Error, Result};

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub cache_capacity: usize,
    /// Default TTL in seconds for entries stored without an explicit TTL
    pub default_ttl: u64,
    /// Token bucket capacity (max burst per client)
    pub rate: f64,
    /// Seconds over which `rate` tokens fully regenerate
    pub per: f64,
    /// Reclaimer interval in seconds
    pub reclaim_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 800)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 600)
    /// - `RATE_LIMIT_RATE` - Requests allowed per window (default: 60)
    /// - `RATE_LIMIT_PER` - Window length in seconds (default: 60)
    /// - `RECLAIM_INTERVAL` - Reclaimer frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_capacity: env_or("CACHE_CAPACITY", defaults.cache_capacity),
            default_ttl: env_or("CACHE_DEFAULT_TTL", defaults.default_ttl),
            rate: env_or("RATE_LIMIT_RATE", defaults.rate),
            per: env_or("RATE_LIMIT_PER", defaults.per),
            reclaim_interval: env_or("RECLAIM_INTERVAL", defaults.reclaim_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    /// Rejects values the cores cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(Error::InvalidConfig(
                "cache capacity must be positive".to_string(),
            ));
        }
        if self.default_ttl == 0 {
            return Err(Error::InvalidConfig(
                "default ttl must be positive".to_string(),
            ));
        }
        if self.default_ttl > MAX_TTL.as_secs() {
            return Err(Error::InvalidConfig(format!(
                "default ttl must not exceed {} seconds, got {}",
                MAX_TTL.as_secs(),
                self.default_ttl
            )));
        }
        if !(self.rate.is_finite() && self.rate >= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "rate must be at least 1, got {}",
                self.rate
            )));
        }
        if self.per()?.is_zero() {
            return Err(Error::InvalidConfig(format!(
                "per must be a positive number of seconds, got {}",
                self.per
            )));
        }
        if self.reclaim_interval == 0 {
            return Err(Error::InvalidConfig(
                "reclaim interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Refill window as a `Duration`. Fails for negative, non-finite or
    /// out-of-range values.
    pub fn per(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.per).map_err(|_| {
            Error::InvalidConfig(format!(
                "per must be a positive number of seconds, got {}",
                self.per
            ))
        })
    }

    pub fn reclaim_interval(&self) -> Duration {
        Duration::from_secs(self.reclaim_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: 800,
            default_ttl: 600,
            rate: 60.0,
            per: 60.0,
            reclaim_interval: 60,
            server_port: 8000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
