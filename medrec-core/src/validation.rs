//! Request validation
//!
//! Validation runs before any external AI call. Every violated constraint is
//! collected so the caller sees the full list at once, never just the first.

use crate::error::{FieldViolation, ValidationError};
use crate::types::{MedicationSource, PatientContext};

/// Maximum plausible patient age in years.
pub const MAX_PATIENT_AGE: u32 = 120;

/// Accumulates field violations across a whole request.
#[derive(Debug, Default)]
pub struct RequestValidator {
    violations: Vec<FieldViolation>,
}

impl RequestValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a non-blank string value.
    pub fn require_non_blank(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.violations
                .push(FieldViolation::new(field, "must not be blank"));
        }
        self
    }

    /// Require that an optional numeric value, when present, does not exceed
    /// the given maximum.
    pub fn require_at_most(&mut self, field: &str, value: Option<u32>, max: u32) -> &mut Self {
        if let Some(v) = value {
            if v > max {
                self.violations
                    .push(FieldViolation::new(field, format!("must be at most {max}")));
            }
        }
        self
    }

    /// Record an arbitrary violation.
    pub fn violation(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.violations.push(FieldViolation::new(field, message));
        self
    }

    /// Ok when no constraint was violated, else the full violation list.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Rejected {
                violations: self.violations,
            })
        }
    }
}

/// Validate a reconciliation request.
///
/// Requires a non-empty source list, a non-blank system and medication per
/// source, and a plausible age when one is given. Quality-assessment requests
/// carry no semantic constraints beyond their types: a sparse record is
/// legitimate input that the composer scores rather than rejects.
pub fn validate_reconcile_request(
    context: &PatientContext,
    sources: &[MedicationSource],
) -> Result<(), ValidationError> {
    let mut validator = RequestValidator::new();

    if sources.is_empty() {
        validator.violation("sources", "must be a non-empty list");
    }
    for (i, source) in sources.iter().enumerate() {
        validator.require_non_blank(&format!("sources[{i}].system"), &source.system);
        validator.require_non_blank(&format!("sources[{i}].medication"), &source.medication);
    }
    validator.require_at_most("patient_context.age", context.age, MAX_PATIENT_AGE);

    validator.finish()
}

// ============================================================================
// TESTS
// ============================================================================
