//! Fire-and-forget history recording.
//!
//! Every completed scoring call is appended to a history sink for audit.
//! Recording must never slow down or fail the response already computed for
//! the caller, so events go through a bounded channel and a detached worker;
//! a full or closed channel is logged and the event dropped.

use async_trait::async_trait;
use medrec_core::{HistoryError, QualityAssessment, ReconciliationResult, Timestamp};
use std::sync::Mutex;
use tokio::sync::mpsc;

const DEFAULT_QUEUE_CAPACITY: usize = 256;

// ============================================================================
// EVENTS
// ============================================================================

/// One completed scoring call.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    ReconciliationCompleted {
        result: ReconciliationResult,
        model: String,
        cached: bool,
        at: Timestamp,
    },
    QualityAssessed {
        assessment: QualityAssessment,
        model: String,
        cached: bool,
        at: Timestamp,
    },
}

// ============================================================================
// SINK TRAIT
// ============================================================================

/// Append-only destination for history events.
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait HistorySink: Send + Sync {
    async fn append(&self, event: HistoryEvent) -> Result<(), HistoryError>;
}

/// In-memory sink for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryHistorySink {
    events: Mutex<Vec<HistoryEvent>>,
}

impl MemoryHistorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HistoryEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HistorySink for MemoryHistorySink {
    async fn append(&self, event: HistoryEvent) -> Result<(), HistoryError> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| HistoryError::AppendFailed {
                reason: "events lock poisoned".to_string(),
            })?;
        events.push(event);
        Ok(())
    }
}

// ============================================================================
// RECORDER
// ============================================================================

/// Non-blocking front end over a history sink.
///
/// `record` enqueues and returns immediately; a spawned worker drains the
/// queue into the sink. Sink failures are logged, never surfaced.
#[derive(Clone)]
pub struct HistoryRecorder {
    tx: mpsc::Sender<HistoryEvent>,
}

impl HistoryRecorder {
    /// Spawn the drain worker and return the recorder handle.
    /// The worker exits when every recorder clone has been dropped.
    pub fn spawn(sink: std::sync::Arc<dyn HistorySink>) -> Self {
        Self::spawn_with_capacity(sink, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn spawn_with_capacity(sink: std::sync::Arc<dyn HistorySink>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<HistoryEvent>(capacity.max(1));

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = sink.append(event).await {
                    tracing::warn!(error = %e, "history append failed, event dropped");
                }
            }
            tracing::debug!("history recorder worker exiting");
        });

        Self { tx }
    }

    /// Enqueue an event without waiting. Queue pressure drops the event.
    pub fn record(&self, event: HistoryEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(error = %HistoryError::QueueFull, "history event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(error = %HistoryError::QueueClosed, "history event dropped");
            }
        }
    }
}

impl std::fmt::Debug for HistoryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryRecorder")
            .field("capacity", &self.tx.max_capacity())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
