//! Error types for MEDREC operations

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single violated field constraint, surfaced inside `ValidationError`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Path of the offending field (e.g. "sources[0].medication").
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Input validation errors. Rejected before any external call is attempted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Request rejected, {} constraint(s) violated: {}", .violations.len(), join_violations(.violations))]
    Rejected { violations: Vec<FieldViolation> },
}

/// Failures of the external generative collaborator, or of recovering
/// structured data from its reply.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExternalError {
    /// The provider failed or returned an error. Retryable upstream.
    #[error("Generative call to {provider} failed: {message}")]
    ServiceFailed { provider: String, message: String },

    /// The provider did not answer within the imposed timeout.
    /// Retryable upstream.
    #[error("Generative call to {provider} timed out after {elapsed_ms}ms")]
    Timeout { provider: String, elapsed_ms: u64 },

    /// Structured extraction failed after stripping known wrapping. The data
    /// itself is bad; retrying this layer cannot help. The original raw text
    /// is retained for diagnostics.
    #[error("Malformed AI response: {reason}")]
    MalformedResponse { reason: String, raw: String },
}

/// Cache read/write failures. Always swallowed and treated as a MISS;
/// caching is a performance optimization, not a correctness requirement.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache lock poisoned")]
    LockPoisoned,

    #[error("Cache persistence failed: {reason}")]
    PersistenceFailed { reason: String },
}

/// History recording failures. Isolated inside the recorder; never alter
/// the response already delivered to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("History queue full, event dropped")]
    QueueFull,

    #[error("History queue closed")]
    QueueClosed,

    #[error("History append failed: {reason}")]
    AppendFailed { reason: String },
}

/// Master error type for all MEDREC errors.
#[derive(Debug, Clone, Error)]
pub enum MedrecError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("External service error: {0}")]
    External(#[from] ExternalError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Result type alias for MEDREC operations.
pub type MedrecResult<T> = Result<T, MedrecError>;

// =============================================================================
// TESTS
// =============================================================================
