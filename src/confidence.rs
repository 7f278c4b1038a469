//! Confidence scoring for assembled responses

use std::collections::BTreeSet;

use crate::retrieval::RetrievedChunk;
use crate::safety::SafetyFlag;
use crate::types::ConfidenceLevel;

/// Derives a discrete confidence level from safety flags, retrieval quality,
/// and generation outcome
pub struct ConfidenceScorer {
    /// Top relevance score at or above this yields high confidence
    high_threshold: f32,
}

impl ConfidenceScorer {
    /// Create a scorer with the given high-confidence threshold
    pub fn new(high_threshold: f32) -> Self {
        Self { high_threshold }
    }

    /// Score a response
    ///
    /// Rules in order: safety-driven fixed responses are authoritative by
    /// construction; a failed generation is never trusted; otherwise
    /// confidence follows the top relevance score. Holding flags and the
    /// generation outcome fixed, the result is non-decreasing in that score.
    pub fn score(
        &self,
        flags: &BTreeSet<SafetyFlag>,
        retrieved: &[RetrievedChunk],
        generation_succeeded: bool,
    ) -> ConfidenceLevel {
        if flags.contains(&SafetyFlag::Emergency) || flags.contains(&SafetyFlag::PhiRequest) {
            return ConfidenceLevel::High;
        }
        if !generation_succeeded {
            return ConfidenceLevel::Low;
        }
        match retrieved.first() {
            Some(top) if top.score >= self.high_threshold => ConfidenceLevel::High,
            Some(_) => ConfidenceLevel::Medium,
            None => ConfidenceLevel::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentChunk;
    use chrono::Utc;

    fn retrieved(score: f32) -> Vec<RetrievedChunk> {
        vec![RetrievedChunk {
            chunk: DocumentChunk {
                chunk_id: "c1".to_string(),
                source_id: "doc.md".to_string(),
                title: "Doc".to_string(),
                category: "general".to_string(),
                text: "text".to_string(),
                updated_at: Utc::now(),
            },
            score,
        }]
    }

    fn flags(values: &[SafetyFlag]) -> BTreeSet<SafetyFlag> {
        values.iter().copied().collect()
    }

    #[test]
    fn safety_routes_are_always_high() {
        let scorer = ConfidenceScorer::new(0.65);
        assert_eq!(
            scorer.score(&flags(&[SafetyFlag::Emergency]), &[], true),
            ConfidenceLevel::High
        );
        // Even a failed generation never downgrades a safety-driven response.
        assert_eq!(
            scorer.score(&flags(&[SafetyFlag::PhiRequest]), &[], false),
            ConfidenceLevel::High
        );
    }

    #[test]
    fn failed_generation_is_low() {
        let scorer = ConfidenceScorer::new(0.65);
        assert_eq!(
            scorer.score(&flags(&[]), &retrieved(0.9), false),
            ConfidenceLevel::Low
        );
    }

    #[test]
    fn follows_top_relevance_score() {
        let scorer = ConfidenceScorer::new(0.65);
        assert_eq!(scorer.score(&flags(&[]), &retrieved(0.9), true), ConfidenceLevel::High);
        assert_eq!(scorer.score(&flags(&[]), &retrieved(0.4), true), ConfidenceLevel::Medium);
        assert_eq!(scorer.score(&flags(&[]), &[], true), ConfidenceLevel::Low);
    }

    #[test]
    fn confidence_is_monotone_in_top_score() {
        let scorer = ConfidenceScorer::new(0.65);
        let rank = |level: ConfidenceLevel| match level {
            ConfidenceLevel::Low => 0,
            ConfidenceLevel::Medium => 1,
            ConfidenceLevel::High => 2,
        };

        let mut previous = 0;
        for step in 0..=20 {
            let score = step as f32 / 20.0;
            let current = rank(scorer.score(&flags(&[]), &retrieved(score), true));
            assert!(current >= previous, "confidence dropped at score {}", score);
            previous = current;
        }
    }
}
