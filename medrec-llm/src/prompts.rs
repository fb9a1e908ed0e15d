//! Prompt builders for the two request kinds.
//!
//! Prompt text is an input to the generative collaborator, not part of the
//! deterministic core; the builders only have to be stable so that equal
//! requests produce equal prompts (and therefore equal cache fingerprints
//! upstream of them).

use medrec_core::{MedicationSource, PatientContext, PatientRecord};
use std::fmt::Write;

/// Build the medication-reconciliation prompt.
pub fn reconciliation_prompt(context: &PatientContext, sources: &[MedicationSource]) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are a clinical decision support system. Analyze conflicting medication records and determine the most likely accurate information.\n"
    );
    let _ = writeln!(prompt, "Patient Context:");
    let _ = writeln!(
        prompt,
        "- Age: {}",
        context
            .age
            .map_or_else(|| "unknown".to_string(), |a| a.to_string())
    );
    let _ = writeln!(prompt, "- Conditions: {}", context.conditions.join(", "));
    let _ = writeln!(
        prompt,
        "- Recent Labs: {}",
        serde_json::to_string(&context.recent_labs).unwrap_or_else(|_| "{}".to_string())
    );

    let _ = writeln!(prompt, "\nConflicting Medication Sources:");
    for (i, source) in sources.iter().enumerate() {
        let _ = writeln!(prompt, "\nSource {}: {}", i + 1, source.system);
        let _ = writeln!(prompt, "- Medication: {}", source.medication);
        if let Some(updated) = source.last_updated.as_deref() {
            let _ = writeln!(prompt, "- Last Updated: {updated}");
        }
        let _ = writeln!(
            prompt,
            "- Reliability: {}",
            source.source_reliability.as_str()
        );
        if let Some(filled) = source.last_filled.as_deref() {
            let _ = writeln!(prompt, "- Last Filled: {filled}");
        }
    }

    prompt.push_str(
        r#"
Analyze these sources and provide a JSON response with:
{
  "reconciled_medication": "most likely accurate medication and dose",
  "confidence_score": 0.0-1.0,
  "reasoning": "detailed clinical reasoning considering recency, reliability, and patient context",
  "recommended_actions": ["action 1", "action 2"],
  "clinical_safety_check": "PASSED or WARNING with explanation"
}

Consider:
1. Source reliability and recency
2. Clinical appropriateness given patient age, conditions, and labs
3. Medication dosing guidelines for patient's condition
4. Drug-disease interactions"#,
    );

    prompt
}

/// Build the data-quality-assessment prompt.
pub fn quality_prompt(record: &PatientRecord) -> String {
    let record_json =
        serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You are a healthcare data quality analyst. Assess the quality of this patient record across multiple dimensions.

Patient Record:
{record_json}

Analyze and provide a JSON response with:
{{
  "completeness_issues": ["list of missing or incomplete fields"],
  "accuracy_issues": ["list of format/validation issues"],
  "plausibility_issues": ["list of clinically implausible values"],
  "timeliness_issues": ["list of outdated data concerns"]
}}

Focus on:
1. Completeness: Missing critical fields (allergies, medications, etc.)
2. Accuracy: Invalid formats, data type mismatches
3. Clinical Plausibility: Physiologically impossible values (e.g., BP 340/180)
4. Timeliness: Stale data (>6 months old)"#
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use medrec_core::{Demographics, Reliability};
    use std::collections::BTreeMap;

    #[test]
    fn test_reconciliation_prompt_includes_context_and_sources() {
        let mut labs = BTreeMap::new();
        labs.insert("creatinine".to_string(), serde_json::json!(1.2));
        let context = PatientContext {
            age: Some(67),
            conditions: vec!["Hypertension".to_string(), "CKD".to_string()],
            recent_labs: labs,
        };
        let sources = vec![MedicationSource {
            system: "pharmacy".to_string(),
            medication: "Lisinopril 10mg".to_string(),
            last_updated: Some("2024-01-15".to_string()),
            last_filled: Some("2024-01-10".to_string()),
            source_reliability: Reliability::High,
        }];

        let prompt = reconciliation_prompt(&context, &sources);
        assert!(prompt.contains("- Age: 67"));
        assert!(prompt.contains("Hypertension, CKD"));
        assert!(prompt.contains("creatinine"));
        assert!(prompt.contains("Source 1: pharmacy"));
        assert!(prompt.contains("- Last Updated: 2024-01-15"));
        assert!(prompt.contains("- Last Filled: 2024-01-10"));
        assert!(prompt.contains("- Reliability: high"));
        assert!(prompt.contains("\"confidence_score\""));
    }

    #[test]
    fn test_reconciliation_prompt_handles_missing_fields() {
        let context = PatientContext {
            age: None,
            conditions: Vec::new(),
            recent_labs: BTreeMap::new(),
        };
        let sources = vec![MedicationSource {
            system: "ehr".to_string(),
            medication: "Metformin 500mg".to_string(),
            last_updated: None,
            last_filled: None,
            source_reliability: Reliability::Unknown,
        }];

        let prompt = reconciliation_prompt(&context, &sources);
        assert!(prompt.contains("- Age: unknown"));
        assert!(!prompt.contains("- Last Updated:"));
        assert!(!prompt.contains("- Last Filled:"));
    }

    #[test]
    fn test_reconciliation_prompt_stable_for_equal_input() {
        let context = PatientContext {
            age: Some(50),
            conditions: vec!["A".to_string()],
            recent_labs: BTreeMap::new(),
        };
        let sources = vec![MedicationSource {
            system: "pharmacy".to_string(),
            medication: "Aspirin 81mg".to_string(),
            last_updated: None,
            last_filled: None,
            source_reliability: Reliability::Medium,
        }];
        assert_eq!(
            reconciliation_prompt(&context, &sources),
            reconciliation_prompt(&context, &sources)
        );
    }

    #[test]
    fn test_quality_prompt_embeds_record() {
        let record = PatientRecord {
            demographics: Some(Demographics {
                name: Some("Jane Doe".to_string()),
                dob: Some("1957-03-02".to_string()),
                gender: Some("female".to_string()),
            }),
            medications: vec!["Lisinopril 10mg".to_string()],
            ..PatientRecord::default()
        };

        let prompt = quality_prompt(&record);
        assert!(prompt.contains("Jane Doe"));
        assert!(prompt.contains("\"completeness_issues\""));
        assert!(prompt.contains("\"plausibility_issues\""));
    }
}
