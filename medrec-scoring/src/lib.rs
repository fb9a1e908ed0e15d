//! MEDREC Scoring - Deterministic Composers
//!
//! The generative collaborator proposes; these composers dispose. Everything
//! here is a pure function of its inputs plus an explicit `now`, so the same
//! record scored at the same instant always yields the same numbers.

pub mod classify;
pub mod confidence;
pub mod quality;

pub use classify::{build_issues, classify_field};
pub use confidence::{compose_confidence, compose_confidence_breakdown, ConfidenceBreakdown};
pub use quality::assess_quality;
