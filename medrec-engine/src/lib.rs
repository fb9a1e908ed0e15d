//! MEDREC Engine - Request Orchestration
//!
//! Ties the cache, the generative provider, and the composers together into
//! the two inbound operations: `reconcile` and `assess_quality`. Also owns
//! the fire-and-forget history recorder and the periodic cache sweep task.

pub mod history;
pub mod jobs;
pub mod service;

pub use history::{HistoryEvent, HistoryRecorder, HistorySink, MemoryHistorySink};
pub use jobs::{cache_sweep_task, CacheSweepConfig, CacheSweepMetrics, CacheSweepSnapshot};
pub use service::ScoringService;
