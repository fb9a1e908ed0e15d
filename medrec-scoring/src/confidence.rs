//! Reconciliation confidence composer.
//!
//! Blends the AI's subjective confidence with three deterministic factors:
//! average source reliability, recency of the freshest source, and
//! completeness of the patient context. Each factor lies in [0, 1] and the
//! weights sum to 1, so the composed score lies in [0, 1] by construction.

use chrono::DateTime;
use medrec_core::{parse_instant, MedicationSource, PatientContext, Timestamp};

const WEIGHT_AI: f64 = 0.40;
const WEIGHT_RELIABILITY: f64 = 0.35;
const WEIGHT_RECENCY: f64 = 0.15;
const WEIGHT_COMPLETENESS: f64 = 0.10;

/// Recency decays linearly to zero at this horizon.
const RECENCY_HORIZON_DAYS: f64 = 180.0;

const SECS_PER_DAY: f64 = 86_400.0;

/// Each factor individually, for observability and tests.
#[derive(Debug, Clone)]
pub struct ConfidenceBreakdown {
    pub ai_confidence: f64,
    pub avg_reliability: f64,
    pub recency: f64,
    pub completeness: f64,
    /// Weighted blend, rounded to 2 decimals.
    pub final_score: f64,
}

/// Compose the final confidence score, rounded to 2 decimals.
pub fn compose_confidence(
    ai_confidence: f64,
    sources: &[MedicationSource],
    context: &PatientContext,
    now: Timestamp,
) -> f64 {
    compose_confidence_breakdown(ai_confidence, sources, context, now).final_score
}

/// Compose the final confidence score with every factor exposed.
pub fn compose_confidence_breakdown(
    ai_confidence: f64,
    sources: &[MedicationSource],
    context: &PatientContext,
    now: Timestamp,
) -> ConfidenceBreakdown {
    let avg_reliability = average_reliability(sources);
    let recency = recency_factor(sources, now);
    let completeness = completeness_factor(context);

    let blended = ai_confidence * WEIGHT_AI
        + avg_reliability * WEIGHT_RELIABILITY
        + recency * WEIGHT_RECENCY
        + completeness * WEIGHT_COMPLETENESS;

    ConfidenceBreakdown {
        ai_confidence,
        avg_reliability,
        recency,
        completeness,
        final_score: round2(blended),
    }
}

/// Mean reliability weight over all sources. Validation guarantees a
/// non-empty list on the request path; an empty list scores the same as an
/// all-unknown one rather than dividing by zero.
fn average_reliability(sources: &[MedicationSource]) -> f64 {
    if sources.is_empty() {
        return 0.5;
    }
    let sum: f64 = sources.iter().map(|s| s.source_reliability.weight()).sum();
    sum / sources.len() as f64
}

/// Linear decay from the freshest source timestamp: 1.0 today, 0.0 at 180
/// days, clamped. A source with no parseable timestamp contributes the
/// epoch, so a list of undated sources scores 0.
fn recency_factor(sources: &[MedicationSource], now: Timestamp) -> f64 {
    let most_recent = sources
        .iter()
        .map(|s| {
            s.recency_timestamp()
                .and_then(parse_instant)
                .unwrap_or(DateTime::UNIX_EPOCH)
        })
        .max()
        .unwrap_or(DateTime::UNIX_EPOCH);

    let days_since = (now - most_recent).num_seconds() as f64 / SECS_PER_DAY;
    (1.0 - days_since / RECENCY_HORIZON_DAYS).clamp(0.0, 1.0)
}

/// Fraction of the three context signals that are present: a non-zero age,
/// at least one condition, at least one recent lab.
fn completeness_factor(context: &PatientContext) -> f64 {
    let has_age = context.age.is_some_and(|a| a != 0);
    let has_conditions = !context.conditions.is_empty();
    let has_labs = !context.recent_labs.is_empty();

    (has_age as u8 + has_conditions as u8 + has_labs as u8) as f64 / 3.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use medrec_core::Reliability;
    use std::collections::BTreeMap;

    fn source(reliability: Reliability, last_updated: Option<String>) -> MedicationSource {
        MedicationSource {
            system: "pharmacy".to_string(),
            medication: "Lisinopril 10mg".to_string(),
            last_updated,
            last_filled: None,
            source_reliability: reliability,
        }
    }

    fn full_context() -> PatientContext {
        let mut labs = BTreeMap::new();
        labs.insert("creatinine".to_string(), serde_json::json!(1.2));
        PatientContext {
            age: Some(67),
            conditions: vec!["Hypertension".to_string()],
            recent_labs: labs,
        }
    }

    #[test]
    fn test_worked_example() {
        // a=0.90, one high-reliability source updated 10 days ago, full
        // context: 0.9*0.40 + 1.0*0.35 + (1-10/180)*0.15 + 1.0*0.10 = 0.9517
        let now = Utc::now();
        let updated = (now - Duration::days(10)).format("%Y-%m-%dT%H:%M:%S").to_string();
        let sources = vec![source(Reliability::High, Some(updated))];

        let breakdown = compose_confidence_breakdown(0.90, &sources, &full_context(), now);
        assert_eq!(breakdown.avg_reliability, 1.0);
        assert!((breakdown.recency - (1.0 - 10.0 / 180.0)).abs() < 1e-6);
        assert_eq!(breakdown.completeness, 1.0);
        assert_eq!(breakdown.final_score, 0.95);
    }

    #[test]
    fn test_average_reliability_mixes_weights() {
        let sources = vec![
            source(Reliability::High, None),
            source(Reliability::Low, None),
        ];
        let breakdown = compose_confidence_breakdown(0.5, &sources, &full_context(), Utc::now());
        assert!((breakdown.avg_reliability - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_reliability_counts_as_medium() {
        let sources = vec![source(Reliability::Unknown, None)];
        let breakdown = compose_confidence_breakdown(0.5, &sources, &full_context(), Utc::now());
        assert_eq!(breakdown.avg_reliability, 0.5);
    }

    #[test]
    fn test_undated_sources_score_zero_recency() {
        let sources = vec![source(Reliability::High, None)];
        let breakdown = compose_confidence_breakdown(0.5, &sources, &full_context(), Utc::now());
        assert_eq!(breakdown.recency, 0.0);
    }

    #[test]
    fn test_unparseable_timestamp_scores_zero_recency() {
        let sources = vec![source(Reliability::High, Some("soonish".to_string()))];
        let breakdown = compose_confidence_breakdown(0.5, &sources, &full_context(), Utc::now());
        assert_eq!(breakdown.recency, 0.0);
    }

    #[test]
    fn test_recency_uses_freshest_source() {
        let now = Utc::now();
        let stale = (now - Duration::days(400)).format("%Y-%m-%d").to_string();
        let fresh = (now - Duration::days(1)).format("%Y-%m-%dT%H:%M:%S").to_string();
        let sources = vec![
            source(Reliability::High, Some(stale)),
            source(Reliability::High, Some(fresh)),
        ];
        let breakdown = compose_confidence_breakdown(0.5, &sources, &full_context(), now);
        assert!(breakdown.recency > 0.9);
    }

    #[test]
    fn test_future_timestamp_clamps_to_one() {
        let now = Utc::now();
        let future = (now + Duration::days(5)).format("%Y-%m-%dT%H:%M:%S").to_string();
        let sources = vec![source(Reliability::High, Some(future))];
        let breakdown = compose_confidence_breakdown(0.5, &sources, &full_context(), now);
        assert_eq!(breakdown.recency, 1.0);
    }

    #[test]
    fn test_completeness_counts_each_signal() {
        let empty = PatientContext {
            age: None,
            conditions: Vec::new(),
            recent_labs: BTreeMap::new(),
        };
        let sources = vec![source(Reliability::High, None)];
        let now = Utc::now();
        assert_eq!(
            compose_confidence_breakdown(0.5, &sources, &empty, now).completeness,
            0.0
        );

        let partial = PatientContext {
            age: Some(40),
            ..empty.clone()
        };
        assert!(
            (compose_confidence_breakdown(0.5, &sources, &partial, now).completeness - 1.0 / 3.0)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn test_zero_age_does_not_count() {
        let context = PatientContext {
            age: Some(0),
            conditions: Vec::new(),
            recent_labs: BTreeMap::new(),
        };
        let sources = vec![source(Reliability::High, None)];
        let breakdown = compose_confidence_breakdown(0.5, &sources, &context, Utc::now());
        assert_eq!(breakdown.completeness, 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.9517), 0.95);
        assert_eq!(round2(0.955), 0.96);
        assert_eq!(round2(1.0), 1.0);
    }
}
