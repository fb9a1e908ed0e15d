//! Domain types for medication reconciliation and data-quality assessment.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

// ============================================================================
// ENUMS
// ============================================================================

/// Discriminator for the two scoring operations. Part of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    MedicationReconciliation,
    DataQualityAssessment,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MedicationReconciliation => "medication_reconciliation",
            Self::DataQualityAssessment => "data_quality_assessment",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "medication_reconciliation" => Some(Self::MedicationReconciliation),
            "data_quality_assessment" => Some(Self::DataQualityAssessment),
            _ => None,
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trustworthiness classification of a medication source.
///
/// Anything the upstream system reports outside the three known levels
/// deserializes as `Unknown` and weighs the same as `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reliability {
    High,
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

impl Reliability {
    /// Numeric weight used by the confidence composer.
    pub fn weight(self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium | Self::Unknown => 0.5,
            Self::Low => 0.2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Unknown => "unknown",
        }
    }
}

impl Default for Reliability {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Severity of a detected data-quality issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

// ============================================================================
// TIMESTAMP PARSING
// ============================================================================

/// Parse a calendar instant from the formats upstream systems actually send:
/// RFC 3339, a naive datetime, or a bare date (taken as midnight UTC).
pub fn parse_instant(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

// ============================================================================
// RECONCILIATION TYPES
// ============================================================================

/// Clinical context for the patient whose medications are being reconciled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientContext {
    /// Age in years, when known. Bounded to 120 by validation.
    #[serde(default)]
    pub age: Option<u32>,
    /// Active condition names, in the order the caller supplied them.
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Recent lab results keyed by lab name.
    #[serde(default)]
    pub recent_labs: BTreeMap<String, serde_json::Value>,
}

/// One system's view of a patient's medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationSource {
    /// Originating system name (e.g. "pharmacy", "hospital_ehr").
    pub system: String,
    /// Medication description as recorded by that system.
    pub medication: String,
    /// When the record was last updated, as the source reported it.
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Fallback timestamp when `last_updated` is absent.
    #[serde(default)]
    pub last_filled: Option<String>,
    #[serde(default)]
    pub source_reliability: Reliability,
}

impl MedicationSource {
    /// The raw timestamp to use for recency: `last_updated`, else
    /// `last_filled`. Blank strings count as absent.
    pub fn recency_timestamp(&self) -> Option<&str> {
        self.last_updated
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.last_filled
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
            })
    }
}

/// Structured payload extracted from the AI's reconciliation reply.
///
/// `confidence_score` is the AI's subjective confidence; the composer blends
/// it with deterministic factors to produce the final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiReconciliation {
    pub reconciled_medication: String,
    pub confidence_score: f64,
    pub reasoning: String,
    #[serde(default)]
    pub recommended_actions: Vec<String>,
    /// "PASSED" or a warning with explanation.
    pub clinical_safety_check: String,
}

/// Final reconciliation result delivered to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub reconciled_medication: String,
    /// Composed confidence in [0, 1], rounded to 2 decimals.
    pub confidence_score: f64,
    pub reasoning: String,
    pub recommended_actions: Vec<String>,
    pub clinical_safety_check: String,
}

impl ReconciliationResult {
    /// Build the final result from the AI payload and the composed score.
    pub fn from_ai(ai: AiReconciliation, confidence_score: f64) -> Self {
        Self {
            reconciled_medication: ai.reconciled_medication,
            confidence_score,
            reasoning: ai.reasoning,
            recommended_actions: ai.recommended_actions,
            clinical_safety_check: ai.clinical_safety_check,
        }
    }
}

// ============================================================================
// QUALITY ASSESSMENT TYPES
// ============================================================================

/// Basic demographics as recorded upstream. All fields optional; the
/// completeness checklist scores their presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Demographics {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// A patient record submitted for quality assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PatientRecord {
    #[serde(default)]
    pub demographics: Option<Demographics>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Vital sign readings keyed by name; values may be numbers or strings.
    #[serde(default)]
    pub vital_signs: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl PatientRecord {
    /// A record with no demographics, medications, conditions, or vital
    /// signs carries no assessable content; accuracy and plausibility are
    /// forced to zero for such records.
    pub fn is_essentially_empty(&self) -> bool {
        self.demographics.is_none()
            && self.medications.is_empty()
            && self.conditions.is_empty()
            && self.vital_signs.is_empty()
    }
}

/// The four issue lists extracted from the AI's quality critique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AiQualityIssues {
    #[serde(default)]
    pub completeness_issues: Vec<String>,
    #[serde(default)]
    pub accuracy_issues: Vec<String>,
    #[serde(default)]
    pub plausibility_issues: Vec<String>,
    #[serde(default)]
    pub timeliness_issues: Vec<String>,
}

/// A single classified data-quality issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Field path the issue refers to (e.g. "vital_signs.heart_rate"),
    /// or "unknown" when no keyword matched.
    pub field: String,
    /// The AI's original issue text, verbatim.
    pub issue: String,
    pub severity: Severity,
}

/// Per-dimension quality scores, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityBreakdown {
    pub completeness: u8,
    pub accuracy: u8,
    pub timeliness: u8,
    pub clinical_plausibility: u8,
}

/// Final quality assessment delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Weighted overall score in [0, 100].
    pub overall_score: u8,
    pub breakdown: QualityBreakdown,
    pub issues_detected: Vec<Issue>,
}

// ============================================================================
// CALL METADATA
// ============================================================================

/// Operational metadata recorded alongside a cached AI response.
/// Never affects correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetadata {
    /// Model identifier that produced the response.
    pub model: String,
    #[serde(default)]
    pub response_time_ms: Option<i64>,
    #[serde(default)]
    pub tokens_used: Option<i64>,
}

// ============================================================================
// TESTS
// ============================================================================
