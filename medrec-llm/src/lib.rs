//! MEDREC LLM - Generative Call Wrapper
//!
//! Provider-agnostic trait for the external text-generation collaborator,
//! plus structured extraction from its (possibly fenced) replies and the
//! prompt builders for both request kinds. One prompt in, one text out;
//! no streaming.

pub mod extract;
pub mod prompts;
pub mod providers;

use async_trait::async_trait;
use medrec_core::ExternalError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub use extract::{extract_json, parse_quality_issues, parse_reconciliation};

// ============================================================================
// GENERATIVE PROVIDER TRAIT
// ============================================================================

/// One raw reply from the generative collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// The reply text, verbatim. May be wrapped in a fenced block.
    pub text: String,
    /// Model identifier that produced the reply.
    pub model: String,
    /// Total tokens consumed, when the provider reports it.
    pub tokens_used: Option<i64>,
}

/// Trait for generative text providers.
/// Implementations must be thread-safe (Send + Sync).
///
/// A call is a single round trip. The implementation must impose its own
/// timeout and report it as `ExternalError::Timeout` so callers can tell a
/// retryable transport failure from a malformed reply.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Send one prompt and return the raw reply.
    async fn generate(&self, prompt: &str) -> Result<Generation, ExternalError>;

    /// Get the model identifier this provider calls.
    fn model_id(&self) -> &str;
}

// ============================================================================
// MOCK PROVIDER FOR TESTING
// ============================================================================

/// Mock generative provider for testing.
/// Replays a queue of canned outcomes and counts calls.
pub struct MockGenerativeProvider {
    model: String,
    replies: Mutex<VecDeque<Result<String, ExternalError>>>,
    calls: AtomicUsize,
}

impl MockGenerativeProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a successful reply text.
    pub fn push_text(&self, text: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Ok(text.into()));
        }
    }

    /// Queue a failure.
    pub fn push_error(&self, error: ExternalError) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Err(error));
        }
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GenerativeProvider for MockGenerativeProvider {
    async fn generate(&self, _prompt: &str) -> Result<Generation, ExternalError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let next = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front());
        match next {
            Some(Ok(text)) => Ok(Generation {
                text,
                model: self.model.clone(),
                tokens_used: None,
            }),
            Some(Err(error)) => Err(error),
            None => Err(ExternalError::ServiceFailed {
                provider: "mock".to_string(),
                message: "no canned reply queued".to_string(),
            }),
        }
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for MockGenerativeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGenerativeProvider")
            .field("model", &self.model)
            .field("calls", &self.call_count())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
