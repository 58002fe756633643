//! Mini Cache - demo host for the cache engine
//!
//! Builds the query, API and user caches, warms them up and reports their
//! metrics until interrupted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_cache::{spawn_metrics_reporter, Cache, CacheConfig, MetricsSink, TracingSink};

const REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Build the three caches from presets (the query cache honours env overrides)
/// 3. Start each cache's TTL reaper and the metrics reporter
/// 4. Run a short warm-up workload
/// 5. Wait for SIGINT/SIGTERM, then stop all background tasks
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Mini Cache");

    let query_config = CacheConfig::from_lookup(|name| {
        std::env::var(name)
            .ok()
            .or_else(|| preset_var(&CacheConfig::query(), name))
    });
    info!(
        "Query cache configuration: max_size={}B, default_ttl={:?}, compression={}, reaper_interval={:?}",
        query_config.max_size_bytes,
        query_config.default_ttl,
        query_config.compression_enabled,
        query_config.reaper_interval
    );

    let sink: Arc<dyn MetricsSink> = Arc::new(TracingSink);
    let query = build_cache(query_config, &sink).context("query cache")?;
    let api = build_cache(CacheConfig::api(), &sink).context("api cache")?;
    let user = build_cache(CacheConfig::user(), &sink).context("user cache")?;
    info!("Caches initialized");

    let reporter = spawn_metrics_reporter(
        vec![
            ("query", query.clone()),
            ("api", api.clone()),
            ("user", user.clone()),
        ],
        REPORT_INTERVAL,
    );

    warm_up(&query, &api, &user).await;

    shutdown_signal().await;

    reporter.abort();
    for cache in [&query, &api, &user] {
        cache.shutdown();
    }
    warn!("Background tasks stopped");

    info!("Shutdown complete");
    Ok(())
}

fn build_cache(config: CacheConfig, sink: &Arc<dyn MetricsSink>) -> anyhow::Result<Arc<Cache<Value>>> {
    let cache = Cache::new(config)?.with_sink(Arc::clone(sink)).with_reaper();
    Ok(Arc::new(cache))
}

/// Preset values rendered as env strings so env vars can override them.
fn preset_var(preset: &CacheConfig, name: &str) -> Option<String> {
    match name {
        "CACHE_MAX_SIZE_BYTES" => Some(preset.max_size_bytes.to_string()),
        "CACHE_DEFAULT_TTL_MS" => Some(preset.default_ttl.as_millis().to_string()),
        _ => None,
    }
}

/// Stores a few representative values and reads some back.
async fn warm_up(query: &Cache<Value>, api: &Cache<Value>, user: &Cache<Value>) {
    let rows: Vec<Value> = (0..200)
        .map(|id| json!({"id": id, "status": "active", "region": "eu-west"}))
        .collect();
    query.put("orders:active", Value::Array(rows), None).await;

    api.put(
        "GET /v1/health",
        json!({"status": "ok"}),
        Some(Duration::from_secs(30)),
    )
    .await;

    user.put("user:1", json!({"name": "Ada", "role": "admin"}), None)
        .await;

    for key in ["orders:active", "orders:archived"] {
        let found = query.get(key).await.is_some();
        info!("Warm-up read of query entry: found={}", found);
    }
    let _ = api.get("GET /v1/health").await;
    let _ = user.has("user:1").await;

    let metrics = query.metrics().await;
    info!(
        "Warm-up complete: query entries={}, compressed={}",
        metrics.total_entries, metrics.compressed_entries
    );
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
