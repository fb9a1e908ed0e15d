//! MEDREC Core - Domain Types
//!
//! Pure data structures and the shared error taxonomy. All other crates
//! depend on this. This crate contains no I/O and no scoring logic.

pub mod error;
pub mod types;
pub mod validation;

pub use error::{
    CacheError, ExternalError, FieldViolation, HistoryError, MedrecError, MedrecResult,
    ValidationError,
};
pub use types::{
    parse_instant, AiQualityIssues, AiReconciliation, CallMetadata, Demographics, Issue,
    MedicationSource, PatientContext, PatientRecord, QualityAssessment, QualityBreakdown,
    ReconciliationResult, Reliability, RequestKind, Severity, Timestamp,
};
pub use validation::validate_reconcile_request;
