//! Configuration Module
//!
//! Handles loading and validating cache configuration, either from
//! environment variables or from the named presets.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

const MIB: u64 = 1024 * 1024;

/// Cache configuration parameters.
///
/// Immutable once a cache has been built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Upper bound on the accounted size of all stored entries
    pub max_size_bytes: u64,
    /// TTL applied to entries stored without an explicit one
    pub default_ttl: Duration,
    /// Whether payloads above the threshold are run-length encoded
    pub compression_enabled: bool,
    /// Whether put/get events are forwarded to the metrics sink
    pub metrics_enabled: bool,
    /// Interval between background TTL sweeps
    pub reaper_interval: Duration,
    /// Reject single entries larger than `max_size_bytes` instead of
    /// letting them overshoot the bound
    pub strict_capacity: bool,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE_BYTES` - Capacity in bytes (default: 100 MiB)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_COMPRESSION` - Enable compression (default: true)
    /// - `CACHE_METRICS` - Enable sink events (default: true)
    /// - `CACHE_REAPER_INTERVAL_SECS` - Sweep frequency in seconds (default: 60)
    /// - `CACHE_STRICT_CAPACITY` - Reject oversized entries (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup, falling back to the
    /// default for anything missing or unparsable.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            max_size_bytes: lookup("CACHE_MAX_SIZE_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_size_bytes),
            default_ttl: lookup("CACHE_DEFAULT_TTL_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_ttl),
            compression_enabled: lookup("CACHE_COMPRESSION")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.compression_enabled),
            metrics_enabled: lookup("CACHE_METRICS")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.metrics_enabled),
            reaper_interval: lookup("CACHE_REAPER_INTERVAL_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.reaper_interval),
            strict_capacity: lookup("CACHE_STRICT_CAPACITY")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.strict_capacity),
        }
    }

    // == Presets ==
    /// Database query results: 50 MiB, 5 minutes, compressed.
    pub fn query() -> Self {
        Self {
            max_size_bytes: 50 * MIB,
            default_ttl: Duration::from_secs(5 * 60),
            ..Self::default()
        }
    }

    /// API responses: 25 MiB, 2 minutes, compressed.
    pub fn api() -> Self {
        Self {
            max_size_bytes: 25 * MIB,
            default_ttl: Duration::from_secs(2 * 60),
            ..Self::default()
        }
    }

    /// User data is usually small, so compression is off.
    pub fn user() -> Self {
        Self {
            max_size_bytes: 10 * MIB,
            default_ttl: Duration::from_secs(10 * 60),
            compression_enabled: false,
            ..Self::default()
        }
    }

    // == Validate ==
    /// Rejects configurations the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_size_bytes == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size_bytes must be greater than zero".to_string(),
            ));
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "default_ttl must be greater than zero".to_string(),
            ));
        }
        if self.reaper_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "reaper_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Default TTL in whole milliseconds, never below 1.
    pub fn default_ttl_ms(&self) -> u64 {
        duration_to_ttl_ms(self.default_ttl)
    }

    /// TTL an entry is stored with: the explicit one unless it is absent
    /// or zero, in which case the default applies.
    pub fn effective_ttl_ms(&self, ttl: Option<Duration>) -> u64 {
        match ttl.map(duration_to_ttl_ms) {
            Some(ms) if ms > 0 => ms,
            _ => self.default_ttl_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 100 * MIB,
            default_ttl: Duration::from_secs(5 * 60),
            compression_enabled: true,
            metrics_enabled: true,
            reaper_interval: Duration::from_secs(60),
            strict_capacity: false,
        }
    }
}

/// Converts a TTL to milliseconds, rounding sub-millisecond values up.
pub(crate) fn duration_to_ttl_ms(ttl: Duration) -> u64 {
    let ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
    if ms == 0 && !ttl.is_zero() {
        1
    } else {
        ms
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
