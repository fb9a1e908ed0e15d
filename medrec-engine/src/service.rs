//! The scoring service: cache-first orchestration of both operations.
//!
//! Request flow: validate, consult the cache, on a miss call the generative
//! provider and extract its structured payload, best-effort store, then run
//! the deterministic composer and record history. Cache and history failures
//! never reach the caller; validation, provider, and extraction failures do.

use crate::history::{HistoryEvent, HistoryRecorder};
use chrono::Utc;
use medrec_cache::ResponseCache;
use medrec_core::{
    validate_reconcile_request, AiQualityIssues, AiReconciliation, CallMetadata, MedicationSource,
    MedrecResult, PatientContext, PatientRecord, QualityAssessment, ReconciliationResult,
    RequestKind,
};
use medrec_llm::{extract_json, parse_quality_issues, parse_reconciliation, prompts, Generation,
    GenerativeProvider};
use medrec_scoring::{assess_quality, compose_confidence};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

/// Entry point for the two inbound scoring operations.
pub struct ScoringService {
    cache: Arc<ResponseCache>,
    provider: Arc<dyn GenerativeProvider>,
    history: Option<HistoryRecorder>,
}

impl ScoringService {
    pub fn new(cache: Arc<ResponseCache>, provider: Arc<dyn GenerativeProvider>) -> Self {
        Self {
            cache,
            provider,
            history: None,
        }
    }

    /// Attach a history recorder. Recording is fire-and-forget; see
    /// [`HistoryRecorder`].
    pub fn with_history(mut self, history: HistoryRecorder) -> Self {
        self.history = Some(history);
        self
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    /// Reconcile conflicting medication sources into a single result with a
    /// composed confidence score.
    pub async fn reconcile(
        &self,
        context: &PatientContext,
        sources: &[MedicationSource],
    ) -> MedrecResult<ReconciliationResult> {
        validate_reconcile_request(context, sources)?;

        let kind = RequestKind::MedicationReconciliation;
        let payload = json!({"patient_context": context, "sources": sources});

        let (ai, cached) = match self.cached_payload::<AiReconciliation>(kind, &payload) {
            Some(ai) => (ai, true),
            None => {
                let prompt = prompts::reconciliation_prompt(context, sources);
                let (value, generation, elapsed_ms) = self.generate_structured(kind, &prompt).await?;
                let ai = parse_reconciliation(value.clone(), &generation.text)?;
                self.store_best_effort(kind, &payload, value, &generation, elapsed_ms);
                (ai, false)
            }
        };

        let score = compose_confidence(ai.confidence_score, sources, context, Utc::now());
        let result = ReconciliationResult::from_ai(ai, score);

        if let Some(history) = &self.history {
            history.record(HistoryEvent::ReconciliationCompleted {
                result: result.clone(),
                model: self.provider.model_id().to_string(),
                cached,
                at: Utc::now(),
            });
        }

        Ok(result)
    }

    /// Assess the quality of a patient record across four dimensions.
    pub async fn assess_quality(&self, record: &PatientRecord) -> MedrecResult<QualityAssessment> {
        let kind = RequestKind::DataQualityAssessment;
        let payload = json!({"patient_record": record});

        let (issues, cached) = match self.cached_payload::<AiQualityIssues>(kind, &payload) {
            Some(issues) => (issues, true),
            None => {
                let prompt = prompts::quality_prompt(record);
                let (value, generation, elapsed_ms) = self.generate_structured(kind, &prompt).await?;
                let issues = parse_quality_issues(value.clone(), &generation.text)?;
                self.store_best_effort(kind, &payload, value, &generation, elapsed_ms);
                (issues, false)
            }
        };

        let assessment = assess_quality(record, &issues, Utc::now());

        if let Some(history) = &self.history {
            history.record(HistoryEvent::QualityAssessed {
                assessment: assessment.clone(),
                model: self.provider.model_id().to_string(),
                cached,
                at: Utc::now(),
            });
        }

        Ok(assessment)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// Cache lookup plus typed deserialization. A cached value that no
    /// longer matches the expected shape is logged and treated as a MISS.
    fn cached_payload<T: serde::de::DeserializeOwned>(
        &self,
        kind: RequestKind,
        payload: &Value,
    ) -> Option<T> {
        let response = self.cache.lookup(kind, payload)?;
        match serde_json::from_value(response) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(error = %e, kind = %kind, "cached payload unreadable, treating as miss");
                None
            }
        }
    }

    /// One provider round trip plus JSON extraction. Elapsed time is
    /// metadata only and never affects the result.
    async fn generate_structured(
        &self,
        kind: RequestKind,
        prompt: &str,
    ) -> MedrecResult<(Value, Generation, i64)> {
        let started = Instant::now();
        let generation = self.provider.generate(prompt).await?;
        let elapsed_ms = started.elapsed().as_millis() as i64;

        tracing::debug!(
            kind = %kind,
            model = %generation.model,
            elapsed_ms,
            tokens_used = ?generation.tokens_used,
            "generation completed"
        );

        let value = extract_json(&generation.text)?;
        Ok((value, generation, elapsed_ms))
    }

    /// Caching is a performance optimization, not a correctness requirement;
    /// store failures are logged and swallowed.
    fn store_best_effort(
        &self,
        kind: RequestKind,
        payload: &Value,
        response: Value,
        generation: &Generation,
        elapsed_ms: i64,
    ) {
        let metadata = CallMetadata {
            model: generation.model.clone(),
            response_time_ms: Some(elapsed_ms),
            tokens_used: generation.tokens_used,
        };
        if let Err(e) = self.cache.store(kind, payload, response, metadata) {
            tracing::warn!(error = %e, kind = %kind, "cache store failed, continuing uncached");
        }
    }
}

impl std::fmt::Debug for ScoringService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringService")
            .field("model", &self.provider.model_id())
            .field("cache_entries", &self.cache.len())
            .field("history", &self.history.is_some())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
