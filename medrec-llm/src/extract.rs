//! Structured extraction from raw AI replies.
//!
//! Models habitually wrap JSON in a markdown fence, sometimes labeled,
//! sometimes with stray backticks around it. Extraction strips that
//! decoration and parses what remains. A reply that still does not parse is
//! a `MalformedResponse` carrying the original raw text; nothing is ever
//! silently defaulted.

use medrec_core::{AiQualityIssues, AiReconciliation, ExternalError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static LABELED_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("Invalid labeled fence regex"));

static UNLABELED_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").expect("Invalid fence regex"));

/// Strip fencing and stray delimiters without parsing.
fn strip_wrapping(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = if trimmed.contains("```json") {
        LABELED_FENCE
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map_or(trimmed, |m| m.as_str())
    } else if trimmed.contains("```") {
        UNLABELED_FENCE
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map_or(trimmed, |m| m.as_str())
    } else {
        trimmed
    };
    inner.trim_matches('`').trim()
}

/// Extract a JSON value from a raw reply, stripping an optional fenced block
/// and surrounding stray backticks first.
pub fn extract_json(raw: &str) -> Result<Value, ExternalError> {
    let candidate = strip_wrapping(raw);
    serde_json::from_str(candidate).map_err(|e| ExternalError::MalformedResponse {
        reason: format!("invalid JSON in AI reply: {e}"),
        raw: raw.to_string(),
    })
}

/// Parse an already-extracted JSON value into the reconciliation payload.
pub fn parse_reconciliation(value: Value, raw: &str) -> Result<AiReconciliation, ExternalError> {
    serde_json::from_value(value).map_err(|e| ExternalError::MalformedResponse {
        reason: format!("reply does not match reconciliation schema: {e}"),
        raw: raw.to_string(),
    })
}

/// Parse an already-extracted JSON value into the four quality-issue lists.
pub fn parse_quality_issues(value: Value, raw: &str) -> Result<AiQualityIssues, ExternalError> {
    serde_json::from_value(value).map_err(|e| ExternalError::MalformedResponse {
        reason: format!("reply does not match quality-issues schema: {e}"),
        raw: raw.to_string(),
    })
}

// ============================================================================
// TESTS
// ============================================================================
