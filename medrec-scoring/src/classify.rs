//! Issue classification.
//!
//! Maps free-text AI issue descriptions onto fixed field paths by ordered,
//! case-insensitive keyword matching, and flattens the four issue lists into
//! one sequence with per-list severities.

use medrec_core::{AiQualityIssues, Issue, Severity};

/// Ordered keyword table; the first matching rule wins. "allerg" is a stem
/// on purpose, it covers both "allergy" and "allergies".
const FIELD_RULES: &[(&[&str], &str)] = &[
    (&["blood pressure", "blood_pressure"], "vital_signs.blood_pressure"),
    (&["heart rate"], "vital_signs.heart_rate"),
    (&["temperature"], "vital_signs.temperature"),
    (&["allerg"], "allergies"),
    (&["medication"], "medications"),
    (&["condition"], "conditions"),
    (&["last_updated", "updated"], "last_updated"),
    (&["demographics"], "demographics"),
];

/// Classify one issue description onto a field path, or "unknown".
pub fn classify_field(issue_text: &str) -> &'static str {
    let lower = issue_text.to_lowercase();
    for (keywords, field) in FIELD_RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return field;
        }
    }
    "unknown"
}

/// Flatten the four AI issue lists into one classified sequence.
///
/// List order is fixed: completeness, accuracy, plausibility, timeliness.
/// Each list keeps its internal order. Plausibility issues are high
/// severity; everything else is medium.
pub fn build_issues(ai_issues: &AiQualityIssues) -> Vec<Issue> {
    let mut issues = Vec::with_capacity(
        ai_issues.completeness_issues.len()
            + ai_issues.accuracy_issues.len()
            + ai_issues.plausibility_issues.len()
            + ai_issues.timeliness_issues.len(),
    );

    for text in &ai_issues.completeness_issues {
        issues.push(classified(text, Severity::Medium));
    }
    for text in &ai_issues.accuracy_issues {
        issues.push(classified(text, Severity::Medium));
    }
    for text in &ai_issues.plausibility_issues {
        issues.push(classified(text, Severity::High));
    }
    for text in &ai_issues.timeliness_issues {
        issues.push(classified(text, Severity::Medium));
    }

    issues
}

fn classified(text: &str, severity: Severity) -> Issue {
    Issue {
        field: classify_field(text).to_string(),
        issue: text.to_string(),
        severity,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_fields() {
        assert_eq!(
            classify_field("Blood pressure reading is impossible"),
            "vital_signs.blood_pressure"
        );
        assert_eq!(classify_field("heart rate out of range"), "vital_signs.heart_rate");
        assert_eq!(classify_field("Temperature not recorded"), "vital_signs.temperature");
        assert_eq!(classify_field("Missing allergy information"), "allergies");
        assert_eq!(classify_field("No allergies documented"), "allergies");
        assert_eq!(classify_field("Medication list incomplete"), "medications");
        assert_eq!(classify_field("Chronic conditions not listed"), "conditions");
        assert_eq!(classify_field("Record not updated recently"), "last_updated");
        assert_eq!(classify_field("Demographics section empty"), "demographics");
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify_field("BLOOD PRESSURE too high"), "vital_signs.blood_pressure");
        assert_eq!(classify_field("MISSING ALLERGIES"), "allergies");
    }

    #[test]
    fn test_classify_first_match_wins() {
        // Mentions both blood pressure and medication; blood pressure is
        // earlier in the table.
        assert_eq!(
            classify_field("blood pressure medication missing"),
            "vital_signs.blood_pressure"
        );
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify_field("something unexpected"), "unknown");
        assert_eq!(classify_field(""), "unknown");
    }

    #[test]
    fn test_build_issues_order_and_severity() {
        let ai_issues = AiQualityIssues {
            completeness_issues: vec![
                "Missing allergy information".to_string(),
                "No conditions listed".to_string(),
            ],
            accuracy_issues: vec!["Invalid date format".to_string()],
            plausibility_issues: vec!["Blood pressure 340/180 impossible".to_string()],
            timeliness_issues: vec!["Record not updated in a year".to_string()],
        };

        let issues = build_issues(&ai_issues);
        assert_eq!(issues.len(), 5);

        // completeness first, internal order preserved
        assert_eq!(issues[0].field, "allergies");
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[1].field, "conditions");

        // then accuracy
        assert_eq!(issues[2].issue, "Invalid date format");
        assert_eq!(issues[2].severity, Severity::Medium);

        // then plausibility at high severity
        assert_eq!(issues[3].field, "vital_signs.blood_pressure");
        assert_eq!(issues[3].severity, Severity::High);

        // timeliness last
        assert_eq!(issues[4].field, "last_updated");
        assert_eq!(issues[4].severity, Severity::Medium);
    }

    #[test]
    fn test_build_issues_empty_lists() {
        assert!(build_issues(&AiQualityIssues::default()).is_empty());
    }

    #[test]
    fn test_build_issues_retains_original_text() {
        let ai_issues = AiQualityIssues {
            completeness_issues: vec!["Missing allergy information".to_string()],
            ..AiQualityIssues::default()
        };
        let issues = build_issues(&ai_issues);
        assert_eq!(issues[0].issue, "Missing allergy information");
    }
}
