//! Cache Metrics Module
//!
//! Running counters and the derived statistics view.

use serde::Serialize;

// == Running Totals ==
/// Counters mutated only by the store's own operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningTotals {
    /// Sum of `size_bytes` over live entries
    pub total_size_bytes: u64,
    /// Successful retrievals
    pub hits: u64,
    /// Failed retrievals (absent, expired or corrupt)
    pub misses: u64,
    /// Entries removed to make room
    pub evictions: u64,
}

impl RunningTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn add_size(&mut self, bytes: u64) {
        self.total_size_bytes += bytes;
    }

    pub fn sub_size(&mut self, bytes: u64) {
        self.total_size_bytes = self.total_size_bytes.saturating_sub(bytes);
    }

    // == Hit Rate ==
    /// hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Complement of the hit rate, also 0.0 before any request.
    pub fn miss_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            1.0 - self.hit_rate()
        }
    }
}

// == Compression Ratio ==
/// Estimated space saved by compression over the compressed entries.
///
/// The uncompressed size is assumed to be twice the stored size, so this is
/// 0.5 whenever any entry is compressed and 0.0 otherwise. It is not a
/// measurement and should not drive capacity planning.
pub fn compression_ratio(compressed_sizes: impl IntoIterator<Item = u64>) -> f64 {
    let (count, stored) = compressed_sizes
        .into_iter()
        .fold((0u64, 0u64), |(count, sum), size| (count + 1, sum + size));

    if count == 0 {
        return 0.0;
    }
    let estimated_original = stored * 2;
    if estimated_original == 0 {
        return 0.0;
    }
    1.0 - (stored as f64 / estimated_original as f64)
}

// == Cache Metrics ==
/// Point-in-time statistics of one cache.
#[derive(Debug, Clone, Serialize)]
pub struct CacheMetrics {
    pub total_entries: usize,
    pub total_size_bytes: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub compression_ratio: f64,
    pub compressed_entries: usize,
    /// RFC 3339 capture time
    pub captured_at: String,
}

impl CacheMetrics {
    pub fn from_totals(
        totals: &RunningTotals,
        total_entries: usize,
        compressed_sizes: Vec<u64>,
    ) -> Self {
        Self {
            total_entries,
            total_size_bytes: totals.total_size_bytes,
            hits: totals.hits,
            misses: totals.misses,
            evictions: totals.evictions,
            hit_rate: totals.hit_rate(),
            miss_rate: totals.miss_rate(),
            compressed_entries: compressed_sizes.len(),
            compression_ratio: compression_ratio(compressed_sizes),
            captured_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
