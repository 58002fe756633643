//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the caches.
//!
//! # Tasks
//! - TTL Reaper: Removes expired cache entries at configured intervals
//! - Metrics Reporter: Logs cache statistics at configured intervals

mod reaper;
mod report;

pub use reaper::spawn_reaper;
pub use report::spawn_metrics_reporter;
