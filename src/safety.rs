//! Safety classification of raw query text
//!
//! The classifier is the single gate the rest of the pipeline honors: it runs
//! before any retrieval or generation and its output is never recomputed or
//! dropped, even when downstream stages fail.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Safety flag attached to a query
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyFlag {
    /// Acute-symptom or distress language; overrides normal generation
    Emergency,
    /// Request for personal medical records; refused without authentication
    PhiRequest,
    /// Symptom-remedy phrasing; answer carries a disclaimer
    MedicalAdvice,
    /// Absence marker kept for schema completeness; the classifier emits an
    /// empty flag set instead of this variant
    None,
}

/// Acute-symptom and distress phrases
const EMERGENCY_TERMS: &[&str] = &[
    "chest pain",
    "severe bleeding",
    "bleeding heavily",
    "difficulty breathing",
    "can't breathe",
    "cannot breathe",
    "shortness of breath",
    "heart attack",
    "stroke",
    "unconscious",
    "not breathing",
    "seizure",
    "choking",
    "severe burn",
    "severe allergic reaction",
    "anaphylaxis",
    "overdose",
    "poisoning",
    "suicidal",
    "suicide",
];

/// Personal-record-access phrases
const PHI_TERMS: &[&str] = &[
    "my medical record",
    "my medical records",
    "my health record",
    "my health records",
    "my test results",
    "my lab results",
    "my lab reports",
    "my prescription history",
    "my prescriptions",
    "my medical history",
    "my discharge summary",
    "my patient file",
];

/// Symptom-remedy-seeking phrases
const ADVICE_TERMS: &[&str] = &[
    "what should i do for",
    "what should i take for",
    "what can i take for",
    "how do i treat",
    "how to treat",
    "how do i cure",
    "how to cure",
    "is it safe to take",
    "can i take",
    "home remedy",
    "home remedies",
    "should i take medicine",
    "which medicine",
];

/// Case-fold and collapse whitespace
pub fn normalize(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Classify query text into a set of safety flags
///
/// Pure function of the text: deterministic, no I/O. The three rule families
/// are evaluated independently, so a single query can carry several flags.
/// An empty set means no special handling is required.
pub fn classify(query_text: &str) -> BTreeSet<SafetyFlag> {
    let normalized = normalize(query_text);
    let mut flags = BTreeSet::new();

    if EMERGENCY_TERMS.iter().any(|term| normalized.contains(term)) {
        flags.insert(SafetyFlag::Emergency);
    }
    if PHI_TERMS.iter().any(|term| normalized.contains(term)) {
        flags.insert(SafetyFlag::PhiRequest);
    }
    if ADVICE_TERMS.iter().any(|term| normalized.contains(term)) {
        flags.insert(SafetyFlag::MedicalAdvice);
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emergency_phrase_is_flagged() {
        let flags = classify("I have chest pain and sweating");
        assert!(flags.contains(&SafetyFlag::Emergency));
    }

    #[test]
    fn phi_phrase_is_flagged() {
        let flags = classify("Show me my medical records");
        assert!(flags.contains(&SafetyFlag::PhiRequest));
        assert!(!flags.contains(&SafetyFlag::Emergency));
    }

    #[test]
    fn advice_phrase_is_flagged() {
        let flags = classify("What should I do for a fever?");
        assert_eq!(flags.len(), 1);
        assert!(flags.contains(&SafetyFlag::MedicalAdvice));
    }

    #[test]
    fn benign_query_has_no_flags() {
        assert!(classify("What are OPD timings on Sunday?").is_empty());
    }

    #[test]
    fn rule_families_are_independent() {
        let flags = classify("I have chest pain, what should I do for it?");
        assert!(flags.contains(&SafetyFlag::Emergency));
        assert!(flags.contains(&SafetyFlag::MedicalAdvice));
    }

    #[test]
    fn matching_ignores_case_and_whitespace() {
        let flags = classify("  CHEST   Pain \n right now");
        assert!(flags.contains(&SafetyFlag::Emergency));
    }

    #[test]
    fn classification_is_idempotent() {
        let text = "can i take my prescription history to another hospital";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  A\tb \n C "), "a b c");
    }
}
