//! Data-quality composer.
//!
//! Scores a patient record on four dimensions, each 0..=100, then blends
//! them into a weighted overall score. The AI contributes issue lists; the
//! dimension math and the physiological bounds checks are entirely local.

use crate::classify::build_issues;
use medrec_core::{
    parse_instant, AiQualityIssues, PatientRecord, QualityAssessment, QualityBreakdown, Timestamp,
};
use serde_json::Value;

const WEIGHT_COMPLETENESS: f64 = 0.30;
const WEIGHT_ACCURACY: f64 = 0.25;
const WEIGHT_TIMELINESS: f64 = 0.20;
const WEIGHT_PLAUSIBILITY: f64 = 0.25;

/// The completeness checklist: name, dob, gender, medications, allergies,
/// conditions, vital signs.
const CHECKLIST_LEN: f64 = 7.0;

const SECS_PER_DAY: f64 = 86_400.0;

/// Assess a patient record against the AI's issue lists.
pub fn assess_quality(
    record: &PatientRecord,
    ai_issues: &AiQualityIssues,
    now: Timestamp,
) -> QualityAssessment {
    let completeness = completeness_score(record, ai_issues.completeness_issues.len());
    let accuracy = accuracy_score(record, &ai_issues.accuracy_issues);
    let timeliness = timeliness_score(record, ai_issues.timeliness_issues.len(), now);
    let clinical_plausibility = plausibility_score(record, ai_issues.plausibility_issues.len());

    let overall = f64::from(completeness) * WEIGHT_COMPLETENESS
        + f64::from(accuracy) * WEIGHT_ACCURACY
        + f64::from(timeliness) * WEIGHT_TIMELINESS
        + f64::from(clinical_plausibility) * WEIGHT_PLAUSIBILITY;

    QualityAssessment {
        overall_score: overall.round() as u8,
        breakdown: QualityBreakdown {
            completeness,
            accuracy,
            timeliness,
            clinical_plausibility,
        },
        issues_detected: build_issues(ai_issues),
    }
}

// ============================================================================
// DIMENSION SCORERS
// ============================================================================

/// Fraction of the 7-field checklist present, minus 5 points per AI issue.
pub fn completeness_score(record: &PatientRecord, issue_count: usize) -> u8 {
    let mut present = 0u8;

    if let Some(demographics) = &record.demographics {
        present += non_blank(demographics.name.as_deref()) as u8;
        present += non_blank(demographics.dob.as_deref()) as u8;
        present += non_blank(demographics.gender.as_deref()) as u8;
    }
    present += !record.medications.is_empty() as u8;
    present += !record.allergies.is_empty() as u8;
    present += !record.conditions.is_empty() as u8;
    present += !record.vital_signs.is_empty() as u8;

    let base = f64::from(present) / CHECKLIST_LEN * 100.0;
    let penalty = issue_count as f64 * 5.0;
    (base - penalty).round().max(0.0) as u8
}

/// 100 minus per-issue deductions; format/validity issues cost more.
/// An essentially empty record has nothing to be accurate about and scores 0.
pub fn accuracy_score(record: &PatientRecord, issues: &[String]) -> u8 {
    if record.is_essentially_empty() {
        return 0;
    }

    let mut score: i64 = 100;
    for issue in issues {
        let lower = issue.to_lowercase();
        if lower.contains("format") || lower.contains("invalid") {
            score -= 15;
        } else {
            score -= 10;
        }
    }
    score.max(0) as u8
}

/// Bucketed age of the record, minus 10 points per AI issue. A record with
/// no usable `last_updated` gets a fixed middle score, penalties ignored.
pub fn timeliness_score(record: &PatientRecord, issue_count: usize, now: Timestamp) -> u8 {
    let updated = match record
        .last_updated
        .as_deref()
        .and_then(parse_instant)
    {
        Some(instant) => instant,
        None => return 50,
    };

    let days_since = (now - updated).num_seconds() as f64 / SECS_PER_DAY;
    let base: i64 = if days_since > 180.0 {
        30
    } else if days_since > 90.0 {
        50
    } else if days_since > 30.0 {
        70
    } else {
        100
    };

    (base - issue_count as i64 * 10).max(0) as u8
}

/// 100 minus hard physiological bounds violations, then minus 15 points per
/// AI issue. The bounds checks fire before and independently of the AI.
pub fn plausibility_score(record: &PatientRecord, issue_count: usize) -> u8 {
    if record.is_essentially_empty() {
        return 0;
    }

    let mut score: i64 = 100;
    let vitals = &record.vital_signs;

    if let Some(bp) = vitals.get("blood_pressure") {
        if blood_pressure_out_of_range(bp) {
            score -= 40;
        }
    }
    if let Some(hr) = vitals.get("heart_rate").and_then(numeric) {
        if !(30.0..=220.0).contains(&hr) {
            score -= 30;
        }
    }
    // Fahrenheit
    if let Some(temp) = vitals.get("temperature").and_then(numeric) {
        if !(90.0..=110.0).contains(&temp) {
            score -= 30;
        }
    }

    (score - issue_count as i64 * 15).max(0) as u8
}

// ============================================================================
// VALUE COERCION
// ============================================================================

fn non_blank(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}

/// Coerce a vital-sign value to a number. Upstream systems send numbers and
/// numeric strings interchangeably; anything else is unassessable and
/// triggers no deduction.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a "systolic/diastolic" reading and check each parseable component
/// against its bound. An unparseable component cannot violate its bound.
fn blood_pressure_out_of_range(value: &Value) -> bool {
    let text = match value {
        Value::String(s) => s.as_str(),
        _ => return false,
    };
    let mut parts = text.split('/');
    let systolic: Option<f64> = parts.next().and_then(|p| p.trim().parse().ok());
    let diastolic: Option<f64> = parts.next().and_then(|p| p.trim().parse().ok());

    systolic.is_some_and(|s| !(60.0..=250.0).contains(&s))
        || diastolic.is_some_and(|d| !(40.0..=150.0).contains(&d))
}

// ============================================================================
// TESTS
// ============================================================================
