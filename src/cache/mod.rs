//! Cache Module
//!
//! Bounded in-memory caching with TTL expiry, size-based eviction,
//! run-length compression and privacy-preserving metrics.

mod codec;
mod entry;
mod eviction;
mod handle;
mod memoize;
mod metrics;
mod obfuscate;
mod sink;
mod size;
mod store;
mod value;


// Re-export public types
pub use codec::{
    compress, decompress, rle_decode, rle_encode, should_compress, COMPRESSION_THRESHOLD_BYTES,
};
pub use entry::{current_timestamp_ms, CacheEntry, EntrySnapshot, Payload, HIT_WEIGHT_MS};
pub use eviction::{plan_evictions, EvictionPlan};
pub use handle::Cache;
pub use memoize::{json_key, memoize, Memoized};
pub use metrics::{CacheMetrics, RunningTotals};
pub use obfuscate::obfuscate_key;
pub use sink::{EventContext, MetricEvent, MetricUnit, MetricsSink, TracingSink};
pub use size::{estimate_binary, estimate_serialized, estimate_text, DEFAULT_SIZE_ESTIMATE};
pub use store::{CacheStore, Hit, PutOutcome};
pub use value::{CacheValue, Json};
