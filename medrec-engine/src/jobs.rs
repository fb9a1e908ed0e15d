//! Cache Sweep Background Task
//!
//! Expired cache entries are invisible to lookups but still occupy memory
//! until a sweep deletes them. This task runs the sweep on a fixed interval,
//! independently of the request path, until the shutdown signal is received.

use medrec_cache::ResponseCache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the cache sweep background task.
#[derive(Debug, Clone)]
pub struct CacheSweepConfig {
    /// How often to sweep expired entries (default: 1 hour)
    pub sweep_interval: Duration,
}

impl Default for CacheSweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl CacheSweepConfig {
    /// Create CacheSweepConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `MEDREC_CACHE_SWEEP_INTERVAL_SECS`: Sweep interval (default: 3600)
    pub fn from_env() -> Self {
        Self {
            sweep_interval: Duration::from_secs(
                std::env::var("MEDREC_CACHE_SWEEP_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
            ),
        }
    }

    /// Create a configuration for development/testing with a short interval.
    pub fn development() -> Self {
        Self {
            sweep_interval: Duration::from_secs(10),
        }
    }
}

// ============================================================================
// METRICS
// ============================================================================

/// Metrics for cache sweep operations.
#[derive(Debug, Default)]
pub struct CacheSweepMetrics {
    /// Total sweep cycles completed since startup
    pub sweep_cycles: AtomicU64,

    /// Total expired entries removed since startup
    pub entries_removed: AtomicU64,
}

impl CacheSweepMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current snapshot of all metrics.
    pub fn snapshot(&self) -> CacheSweepSnapshot {
        CacheSweepSnapshot {
            sweep_cycles: self.sweep_cycles.load(Ordering::Relaxed),
            entries_removed: self.entries_removed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of sweep metrics at a point in time.
#[derive(Debug, Clone)]
pub struct CacheSweepSnapshot {
    pub sweep_cycles: u64,
    pub entries_removed: u64,
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Background task that periodically sweeps expired cache entries.
///
/// Runs until the shutdown signal flips to `true`, then returns the metrics
/// collected during its lifetime.
///
/// # Example
///
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = tokio::spawn(cache_sweep_task(cache, CacheSweepConfig::from_env(), shutdown_rx));
///
/// // Later, trigger shutdown
/// let _ = shutdown_tx.send(true);
/// let metrics = handle.await.unwrap();
/// ```
pub async fn cache_sweep_task(
    cache: Arc<ResponseCache>,
    config: CacheSweepConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Arc<CacheSweepMetrics> {
    let metrics = Arc::new(CacheSweepMetrics::new());

    let mut sweep_interval = interval(config.sweep_interval);
    sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        sweep_interval_secs = config.sweep_interval.as_secs(),
        "Cache sweep task started"
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!("Cache sweep task shutting down");
                    break;
                }
            }

            _ = sweep_interval.tick() => {
                let removed = cache.sweep();
                metrics.sweep_cycles.fetch_add(1, Ordering::Relaxed);
                metrics.entries_removed.fetch_add(removed as u64, Ordering::Relaxed);

                if removed > 0 {
                    tracing::info!(removed, remaining = cache.len(), "Cache sweep cycle completed");
                } else {
                    tracing::trace!("Cache sweep cycle completed with nothing expired");
                }
            }
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        sweep_cycles = snapshot.sweep_cycles,
        entries_removed = snapshot.entries_removed,
        "Cache sweep task completed"
    );

    metrics
}

// ============================================================================
// TESTS
// ============================================================================
