//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::warn;

use crate::cache::codec::{compress, decompress, should_compress};
use crate::cache::size::estimate_binary;
use crate::cache::value::CacheValue;
use crate::error::CodecError;

/// Retention score bonus per recorded hit, in milliseconds.
pub const HIT_WEIGHT_MS: u64 = 1000;

// == Payload ==
/// Stored form of a value.
#[derive(Debug, Clone)]
pub enum Payload<V> {
    /// Value kept as-is
    Plain(V),
    /// Run-length encoded bytes of the value
    Compressed(Vec<u8>),
}

// == Cache Entry ==
/// Represents a single cache entry with its payload and bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored payload (post-compression if applicable)
    pub payload: Payload<V>,
    /// Last write timestamp (Unix milliseconds)
    pub written_at: u64,
    /// Time-to-live in milliseconds
    pub ttl_ms: u64,
    /// Successful reads since the last write
    pub hit_count: u64,
    /// Accounted cost of the stored form
    pub size_bytes: u64,
}

impl<V: CacheValue> CacheEntry<V> {
    // == Constructor ==
    /// Measures a value and compresses it when the policy allows.
    ///
    /// A compression failure is logged and the value is stored uncompressed.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_ms` - Effective TTL in milliseconds
    /// * `compression_enabled` - Whether the cache compresses large payloads
    pub fn build(value: V, ttl_ms: u64, compression_enabled: bool) -> Self {
        let raw_size = value.estimate_size();

        let (payload, size_bytes) = if should_compress(compression_enabled, raw_size) {
            match compress(&value) {
                Ok(bytes) => {
                    let size = estimate_binary(&bytes);
                    (Payload::Compressed(bytes), size)
                }
                Err(err) => {
                    warn!("Compression failed, storing uncompressed: {}", err);
                    (Payload::Plain(value), raw_size)
                }
            }
        } else {
            (Payload::Plain(value), raw_size)
        };

        Self {
            payload,
            written_at: current_timestamp_ms(),
            ttl_ms,
            hit_count: 0,
            size_bytes,
        }
    }

    // == Value ==
    /// Returns the stored value, decompressing it if needed.
    pub fn value(&self) -> Result<V, CodecError> {
        match &self.payload {
            Payload::Plain(value) => Ok(value.clone()),
            Payload::Compressed(bytes) => decompress(bytes),
        }
    }
}

impl<V> CacheEntry<V> {
    /// Whether the payload must be decompressed before being returned.
    pub fn is_compressed(&self) -> bool {
        matches!(self.payload, Payload::Compressed(_))
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once strictly more than `ttl_ms` has elapsed
    /// since it was written.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.written_at) > self.ttl_ms
    }

    // == Retention Score ==
    /// Eviction rank: lower scores are evicted first.
    ///
    /// Recent writes and frequent reads both raise the score.
    pub fn retention_score(&self) -> u64 {
        self.written_at
            .saturating_add(self.hit_count.saturating_mul(HIT_WEIGHT_MS))
    }

    // == Time To Live ==
    /// Remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let expires_at = self.written_at.saturating_add(self.ttl_ms);
        expires_at.saturating_sub(current_timestamp_ms())
    }

    /// Metadata view of the entry.
    pub fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            size_bytes: self.size_bytes,
            compressed: self.is_compressed(),
            hit_count: self.hit_count,
            ttl_ms: self.ttl_ms,
            written_at: self.written_at,
        }
    }
}

// == Entry Snapshot ==
/// Entry metadata without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntrySnapshot {
    pub size_bytes: u64,
    pub compressed: bool,
    pub hit_count: u64,
    pub ttl_ms: u64,
    pub written_at: u64,
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::value::Json;
    use std::collections::HashMap;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_small_value_not_compressed() {
        let entry = CacheEntry::build("short".to_string(), 60_000, true);

        assert!(!entry.is_compressed());
        assert_eq!(entry.size_bytes, 10);
        assert_eq!(entry.hit_count, 0);
        assert_eq!(entry.value().unwrap(), "short");
    }

    #[test]
    fn test_entry_large_value_compressed() {
        let value = "x".repeat(2000);
        let entry = CacheEntry::build(value.clone(), 60_000, true);

        assert!(entry.is_compressed());
        // 2000 bytes -> 7 runs of 255 and one of 215
        assert_eq!(entry.size_bytes, 16);
        assert_eq!(entry.value().unwrap(), value);
    }

    #[test]
    fn test_entry_compression_disabled() {
        let value = "x".repeat(2000);
        let entry = CacheEntry::build(value, 60_000, false);

        assert!(!entry.is_compressed());
        assert_eq!(entry.size_bytes, 4000);
    }

    /// Large value whose byte encoding always fails.
    #[derive(Debug, Clone, PartialEq)]
    struct Unencodable(u64);

    impl CacheValue for Unencodable {
        fn estimate_size(&self) -> u64 {
            self.0
        }

        fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
            let mut map = HashMap::new();
            map.insert((1u8, 2u8), 0u8);
            serde_json::to_vec(&map).map_err(CodecError::Encode)
        }

        fn from_bytes(_bytes: Vec<u8>) -> Result<Self, CodecError> {
            Ok(Unencodable(0))
        }
    }

    #[test]
    fn test_entry_compression_failure_falls_back() {
        let entry = CacheEntry::build(Unencodable(5000), 60_000, true);

        assert!(!entry.is_compressed());
        assert_eq!(entry.size_bytes, 5000);
        assert_eq!(entry.value().unwrap(), Unencodable(5000));
    }

    #[test]
    fn test_entry_unmeasurable_value_uses_default() {
        let mut map = HashMap::new();
        map.insert((1u8, 2u8), "v".to_string());
        let entry = CacheEntry::build(Json(map), 60_000, true);

        // the default estimate sits at the threshold, so nothing is compressed
        assert!(!entry.is_compressed());
        assert_eq!(entry.size_bytes, 1024);
    }

    #[test]
    fn test_entry_expiration_boundary() {
        let entry = CacheEntry {
            payload: Payload::Plain("v".to_string()),
            written_at: 1_000,
            ttl_ms: 100,
            hit_count: 0,
            size_bytes: 2,
        };

        assert!(!entry.is_expired_at(1_000));
        assert!(!entry.is_expired_at(1_100));
        assert!(entry.is_expired_at(1_101));
        // clock skew backwards never expires
        assert!(!entry.is_expired_at(500));
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let entry = CacheEntry::build("v".to_string(), 1, true);
        sleep(Duration::from_millis(5));
        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining_ms(), 0);
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::build("v".to_string(), 10_000, true);
        let remaining = entry.ttl_remaining_ms();
        assert!(remaining <= 10_000);
        assert!(remaining >= 9_000);
    }

    #[test]
    fn test_retention_score() {
        let mut entry = CacheEntry {
            payload: Payload::Plain(vec![1u8]),
            written_at: 5_000,
            ttl_ms: 100,
            hit_count: 0,
            size_bytes: 1,
        };
        assert_eq!(entry.retention_score(), 5_000);

        entry.hit_count = 3;
        assert_eq!(entry.retention_score(), 8_000);
    }

    #[test]
    fn test_corrupt_payload_fails_to_decode() {
        let entry: CacheEntry<String> = CacheEntry {
            payload: Payload::Compressed(vec![2, b'a', 1]),
            written_at: current_timestamp_ms(),
            ttl_ms: 1_000,
            hit_count: 0,
            size_bytes: 3,
        };
        assert!(matches!(
            entry.value(),
            Err(CodecError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_snapshot() {
        let entry = CacheEntry::build("x".repeat(2000), 42, true);
        let snapshot = entry.snapshot();
        assert!(snapshot.compressed);
        assert_eq!(snapshot.size_bytes, 16);
        assert_eq!(snapshot.ttl_ms, 42);
    }
}
