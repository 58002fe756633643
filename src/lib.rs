//! Mini Cache - A bounded in-memory cache engine
//!
//! Provides size-bounded caching with TTL expiry, retention-score eviction,
//! run-length compression of large payloads and privacy-preserving metrics.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{memoize, Cache, CacheMetrics, CacheValue, Json, MetricsSink, TracingSink};
pub use config::CacheConfig;
pub use error::{CacheError, CodecError};
pub use tasks::{spawn_metrics_reporter, spawn_reaper};
