//! Eviction Policy Module
//!
//! Picks the entries to drop when an insert would exceed capacity.
//!
//! Entries are ranked by retention score (`written_at + hit_count * 1000`)
//! and removed lowest first. This is a cheap blend of recency and frequency,
//! not an exact LRU or LFU ordering.

use std::collections::HashMap;

use crate::cache::entry::CacheEntry;

// == Eviction Plan ==
/// Keys to evict, in eviction order, and the bytes they free.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EvictionPlan {
    pub keys: Vec<String>,
    pub freed_bytes: u64,
}

impl EvictionPlan {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// == Fits ==
/// Whether `incoming` more bytes stay within `max_size`.
pub fn fits(total_size: u64, incoming: u64, max_size: u64) -> bool {
    total_size
        .checked_add(incoming)
        .map_or(false, |needed| needed <= max_size)
}

// == Plan Evictions ==
/// Chooses victims in ascending retention score until the incoming entry
/// fits or nothing is left.
///
/// Equal scores fall back to key order so the plan is deterministic.
pub fn plan_evictions<V>(
    entries: &HashMap<String, CacheEntry<V>>,
    total_size: u64,
    incoming: u64,
    max_size: u64,
) -> EvictionPlan {
    if fits(total_size, incoming, max_size) {
        return EvictionPlan::default();
    }

    let mut ranked: Vec<(u64, &String, u64)> = entries
        .iter()
        .map(|(key, entry)| (entry.retention_score(), key, entry.size_bytes))
        .collect();
    ranked.sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    let mut plan = EvictionPlan::default();
    for (_, key, size) in ranked {
        if fits(total_size.saturating_sub(plan.freed_bytes), incoming, max_size) {
            break;
        }
        plan.keys.push(key.clone());
        plan.freed_bytes += size;
    }

    plan
}
