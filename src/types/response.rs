//! Response types for processed queries

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::safety::SafetyFlag;

/// Discrete confidence level, derived by the confidence scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Final structured response returned to the caller
///
/// Immutable once constructed. `citations` lists source document identifiers
/// of cited chunks, deduplicated, in order of first use in the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated (or fixed-protocol) answer text
    pub answer: String,
    /// How well-supported the answer is
    pub confidence: ConfidenceLevel,
    /// Source document identifiers backing the answer
    pub citations: Vec<String>,
    /// Safety flags computed for the query
    pub safety_flags: Vec<SafetyFlag>,
    /// Suggested follow-up questions, at most two
    pub follow_up_questions: Vec<String>,
}

impl ChatResponse {
    /// Assemble a response; flags are emitted in their set order for
    /// deterministic serialization.
    pub fn new(
        answer: String,
        confidence: ConfidenceLevel,
        citations: Vec<String>,
        safety_flags: &BTreeSet<SafetyFlag>,
        follow_up_questions: Vec<String>,
    ) -> Self {
        debug_assert!(follow_up_questions.len() <= 2);
        Self {
            answer,
            confidence,
            citations,
            safety_flags: safety_flags.iter().copied().collect(),
            follow_up_questions,
        }
    }

    /// Whether a given flag was raised for this query
    pub fn has_flag(&self, flag: SafetyFlag) -> bool {
        self.safety_flags.contains(&flag)
    }
}
