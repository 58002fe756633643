//! Metrics Sink Module
//!
//! Outbound telemetry events. Keys only ever leave the engine obfuscated.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

// == Metric Unit ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricUnit {
    Bytes,
    Count,
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricUnit::Bytes => write!(f, "bytes"),
            MetricUnit::Count => write!(f, "count"),
        }
    }
}

// == Event Context ==
/// Extra fields attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventContext {
    /// Obfuscated cache key
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_ms: Option<u64>,
}

// == Metric Event ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEvent {
    pub name: &'static str,
    pub value: u64,
    pub unit: MetricUnit,
    pub context: EventContext,
}

impl MetricEvent {
    pub const CACHE_SET: &'static str = "cache_set";
    pub const CACHE_HIT: &'static str = "cache_hit";

    /// A stored entry; `value` is its accounted size.
    pub fn set(key_token: String, size_bytes: u64, compressed: bool, ttl_ms: u64) -> Self {
        Self {
            name: Self::CACHE_SET,
            value: size_bytes,
            unit: MetricUnit::Bytes,
            context: EventContext {
                key: key_token,
                compressed: Some(compressed),
                ttl_ms: Some(ttl_ms),
            },
        }
    }

    /// A successful read; `value` is the entry's hit count.
    pub fn hit(key_token: String, hit_count: u64) -> Self {
        Self {
            name: Self::CACHE_HIT,
            value: hit_count,
            unit: MetricUnit::Count,
            context: EventContext {
                key: key_token,
                compressed: None,
                ttl_ms: None,
            },
        }
    }
}

// == Metrics Sink ==
/// Receiver of cache telemetry.
///
/// Implementations should not block. Errors are logged by the cache and
/// never reach the caller of the cache operation.
pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricEvent) -> anyhow::Result<()>;
}

/// Hands an event to a sink, logging and discarding any failure.
pub(crate) fn emit(sink: &dyn MetricsSink, event: MetricEvent) {
    let name = event.name;
    if let Err(err) = sink.record(event) {
        warn!("Metrics sink rejected {} event: {:#}", name, err);
    }
}

// == Tracing Sink ==
/// Writes events to the tracing log at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn record(&self, event: MetricEvent) -> anyhow::Result<()> {
        let context = serde_json::to_string(&event.context)?;
        debug!(
            metric = event.name,
            value = event.value,
            unit = %event.unit,
            context = %context,
            "cache metric"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSink {
        calls: AtomicUsize,
    }

    impl MetricsSink for FailingSink {
        fn record(&self, _event: MetricEvent) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("collector unreachable")
        }
    }

    #[test]
    fn test_set_event() {
        let event = MetricEvent::set("2p".to_string(), 128, true, 60_000);
        assert_eq!(event.name, "cache_set");
        assert_eq!(event.unit, MetricUnit::Bytes);
        assert_eq!(event.value, 128);
        assert_eq!(event.context.compressed, Some(true));
        assert_eq!(event.context.ttl_ms, Some(60_000));
    }

    #[test]
    fn test_hit_event_serializes_without_empty_fields() {
        let event = MetricEvent::hit("2p".to_string(), 3);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "cache_hit");
        assert_eq!(json["unit"], "count");
        assert_eq!(json["context"], serde_json::json!({"key": "2p"}));
    }

    #[test]
    fn test_emit_swallows_errors() {
        let sink = FailingSink {
            calls: AtomicUsize::new(0),
        };
        emit(&sink, MetricEvent::hit("x".to_string(), 1));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tracing_sink_accepts_events() {
        assert!(TracingSink
            .record(MetricEvent::set("x".to_string(), 1, false, 1))
            .is_ok());
    }
}
