//! Answer synthesis across the four response routes

pub mod citation;
pub mod prompt;

pub use prompt::PromptBuilder;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::knowledge::ReferenceData;
use crate::providers::LlmProvider;
use crate::retrieval::RetrievedChunk;
use crate::safety::SafetyFlag;

/// Disclaimer appended when the query seeks medical advice
const MEDICAL_DISCLAIMER: &str = "Please note: this is general information, not medical advice. \
     Consult a qualified healthcare professional about your specific situation.";

/// Fixed refusal for personal-record requests
const PHI_REFUSAL: &str = "I can't show personal medical records, test results, or prescription \
     history here. Those require a secure, authenticated channel such as the hospital's patient \
     portal or the medical records department, and this assistant doesn't provide one. I'm happy \
     to help with general questions about hospital services instead.";

/// Fixed answer when generation is unavailable
const FALLBACK_ANSWER: &str = "I'm sorry, I'm having trouble answering right now. Please try \
     again in a moment, or contact the hospital front desk for help.";

/// Follow-up offered with the emergency protocol message
const EMERGENCY_FOLLOW_UP: &str = "Call emergency services now. Is there anything else you need \
     while help is on the way?";

/// Which of the four answer paths a query takes, decided once per query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerRoute {
    /// Fixed emergency protocol, highest priority
    Emergency,
    /// Fixed refusal of personal-record access
    PhiRefusal,
    /// Generation grounded in retrieved chunks
    Grounded,
    /// Unconstrained conversational generation, nothing retrieved
    Conversational,
}

impl AnswerRoute {
    /// Decide the route from the safety flags and retrieval outcome
    pub fn decide(flags: &BTreeSet<SafetyFlag>, have_chunks: bool) -> Self {
        if flags.contains(&SafetyFlag::Emergency) {
            Self::Emergency
        } else if flags.contains(&SafetyFlag::PhiRequest) {
            Self::PhiRefusal
        } else if have_chunks {
            Self::Grounded
        } else {
            Self::Conversational
        }
    }
}

/// Output of the response generator, before confidence scoring
#[derive(Debug, Clone)]
pub struct GeneratedAnswer {
    /// Which path produced the answer
    pub route: AnswerRoute,
    /// Answer text
    pub answer: String,
    /// Cited source ids, first-use order
    pub citations: Vec<String>,
    /// Follow-up questions, at most two
    pub follow_ups: Vec<String>,
    /// False when the LLM call failed and the fallback answer was used
    pub generation_succeeded: bool,
}

/// Synthesizes the final answer text, citations, and follow-ups
pub struct ResponseGenerator {
    llm: Arc<dyn LlmProvider>,
    reference: Arc<ReferenceData>,
}

impl ResponseGenerator {
    /// Create a generator over the given LLM and reference data
    pub fn new(llm: Arc<dyn LlmProvider>, reference: Arc<ReferenceData>) -> Self {
        Self { llm, reference }
    }

    /// Produce the answer for a query
    ///
    /// Never fails: LLM errors degrade to the fixed fallback answer with
    /// `generation_succeeded = false`, and the safety-driven routes never
    /// touch the LLM at all.
    pub async fn generate(
        &self,
        query_text: &str,
        flags: &BTreeSet<SafetyFlag>,
        retrieved: &[RetrievedChunk],
    ) -> GeneratedAnswer {
        let route = AnswerRoute::decide(flags, !retrieved.is_empty());

        match route {
            AnswerRoute::Emergency => self.emergency_answer(),
            AnswerRoute::PhiRefusal => Self::phi_answer(),
            AnswerRoute::Grounded => self.grounded_answer(query_text, flags, retrieved).await,
            AnswerRoute::Conversational => self.conversational_answer(query_text, flags).await,
        }
    }

    /// Fixed emergency protocol interpolated with the contact directory
    fn emergency_answer(&self) -> GeneratedAnswer {
        let mut answer = String::from(
            "Your message suggests a medical emergency.\n\n\
             1. Call emergency services or come to the emergency department immediately.\n\
             2. Do not wait for an online answer; emergencies need in-person care.\n\
             3. If someone is with you, ask them to help you get to the hospital.\n",
        );

        if !self.reference.emergency_contacts.is_empty() {
            answer.push_str("\nEmergency contacts:\n");
            for (service, contact) in &self.reference.emergency_contacts {
                answer.push_str(&format!("- {}: {}\n", service, contact));
            }
        }

        GeneratedAnswer {
            route: AnswerRoute::Emergency,
            answer,
            citations: Vec::new(),
            follow_ups: vec![EMERGENCY_FOLLOW_UP.to_string()],
            generation_succeeded: true,
        }
    }

    /// Fixed refusal; any retrieved chunks are discarded, never referenced
    fn phi_answer() -> GeneratedAnswer {
        GeneratedAnswer {
            route: AnswerRoute::PhiRefusal,
            answer: PHI_REFUSAL.to_string(),
            citations: Vec::new(),
            follow_ups: Vec::new(),
            generation_succeeded: true,
        }
    }

    async fn grounded_answer(
        &self,
        query_text: &str,
        flags: &BTreeSet<SafetyFlag>,
        retrieved: &[RetrievedChunk],
    ) -> GeneratedAnswer {
        let context = PromptBuilder::build_context(retrieved);
        let prompt = PromptBuilder::build_grounded_prompt(query_text, &context, retrieved);

        match self.llm.generate(&prompt).await {
            Ok(mut answer) => {
                let citations = citation::link_citations(&answer, retrieved);
                if flags.contains(&SafetyFlag::MedicalAdvice) {
                    answer = format!("{}\n\n{}", answer.trim_end(), MEDICAL_DISCLAIMER);
                }
                let follow_ups = self.follow_ups_for_top_chunk(retrieved);
                GeneratedAnswer {
                    route: AnswerRoute::Grounded,
                    answer,
                    citations,
                    follow_ups,
                    generation_succeeded: true,
                }
            }
            Err(e) => {
                tracing::error!("grounded generation failed: {}", e);
                Self::fallback_answer(AnswerRoute::Grounded, flags)
            }
        }
    }

    async fn conversational_answer(
        &self,
        query_text: &str,
        flags: &BTreeSet<SafetyFlag>,
    ) -> GeneratedAnswer {
        let prompt = PromptBuilder::build_conversational_prompt(query_text);

        match self.llm.generate(&prompt).await {
            Ok(mut answer) => {
                if flags.contains(&SafetyFlag::MedicalAdvice) {
                    answer = format!("{}\n\n{}", answer.trim_end(), MEDICAL_DISCLAIMER);
                }
                GeneratedAnswer {
                    route: AnswerRoute::Conversational,
                    answer,
                    citations: Vec::new(),
                    follow_ups: Vec::new(),
                    generation_succeeded: true,
                }
            }
            Err(e) => {
                tracing::error!("conversational generation failed: {}", e);
                Self::fallback_answer(AnswerRoute::Conversational, flags)
            }
        }
    }

    /// Degraded answer for generation failures; safety handling is preserved
    fn fallback_answer(route: AnswerRoute, flags: &BTreeSet<SafetyFlag>) -> GeneratedAnswer {
        let mut answer = FALLBACK_ANSWER.to_string();
        if flags.contains(&SafetyFlag::MedicalAdvice) {
            answer = format!("{}\n\n{}", answer, MEDICAL_DISCLAIMER);
        }
        GeneratedAnswer {
            route,
            answer,
            citations: Vec::new(),
            follow_ups: Vec::new(),
            generation_succeeded: false,
        }
    }

    /// Follow-ups from the topic category of the top-ranked chunk, capped at 2
    fn follow_ups_for_top_chunk(&self, retrieved: &[RetrievedChunk]) -> Vec<String> {
        retrieved
            .first()
            .map(|top| {
                self.reference
                    .follow_ups_for(&top.chunk.category)
                    .iter()
                    .take(2)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::types::DocumentChunk;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::BTreeMap;

    /// Scripted LLM that returns a fixed reply or always fails
    struct ScriptedLlm {
        reply: Option<String>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.reply
                .clone()
                .ok_or_else(|| Error::llm("backend down"))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(self.reply.is_some())
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn reference() -> Arc<ReferenceData> {
        let mut contacts = BTreeMap::new();
        contacts.insert("ambulance".to_string(), "102".to_string());
        let mut follow_ups = BTreeMap::new();
        follow_ups.insert(
            "timings".to_string(),
            vec![
                "Do you want the visiting hours too?".to_string(),
                "Should I list department-wise OPD timings?".to_string(),
                "A third question that must never surface".to_string(),
            ],
        );
        Arc::new(ReferenceData {
            emergency_contacts: contacts,
            taxonomy: Vec::new(),
            follow_ups,
        })
    }

    fn generator(reply: Option<&str>) -> ResponseGenerator {
        ResponseGenerator::new(
            Arc::new(ScriptedLlm {
                reply: reply.map(str::to_string),
            }),
            reference(),
        )
    }

    fn retrieved(source_id: &str, title: &str, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk: DocumentChunk {
                chunk_id: format!("{}-1", source_id),
                source_id: source_id.to_string(),
                title: title.to_string(),
                category: "timings".to_string(),
                text: text.to_string(),
                updated_at: Utc::now(),
            },
            score: 0.9,
        }
    }

    fn flags(values: &[SafetyFlag]) -> BTreeSet<SafetyFlag> {
        values.iter().copied().collect()
    }

    #[test]
    fn emergency_wins_route_priority() {
        let both = flags(&[SafetyFlag::Emergency, SafetyFlag::PhiRequest]);
        assert_eq!(AnswerRoute::decide(&both, true), AnswerRoute::Emergency);
        let phi = flags(&[SafetyFlag::PhiRequest, SafetyFlag::MedicalAdvice]);
        assert_eq!(AnswerRoute::decide(&phi, true), AnswerRoute::PhiRefusal);
        assert_eq!(AnswerRoute::decide(&flags(&[]), false), AnswerRoute::Conversational);
    }

    #[tokio::test]
    async fn emergency_answer_carries_contacts_and_no_citations() {
        let generated = generator(Some("unused"))
            .generate("chest pain", &flags(&[SafetyFlag::Emergency]), &[])
            .await;
        assert_eq!(generated.route, AnswerRoute::Emergency);
        assert!(generated.answer.contains("ambulance: 102"));
        assert!(generated.citations.is_empty());
        assert!(generated.follow_ups.len() <= 1);
    }

    #[tokio::test]
    async fn phi_refusal_discards_retrieved_chunks() {
        let chunks = vec![retrieved("opd.md", "OPD Guide", "OPD opens at 9am sharp")];
        let generated = generator(Some("unused"))
            .generate("my records", &flags(&[SafetyFlag::PhiRequest]), &chunks)
            .await;
        assert_eq!(generated.route, AnswerRoute::PhiRefusal);
        assert!(generated.citations.is_empty());
        assert!(!generated.answer.contains("OPD opens at 9am sharp"));
    }

    #[tokio::test]
    async fn grounded_answer_links_citations_and_follow_ups() {
        let chunks = vec![retrieved("opd.md", "OPD Guide", "OPD opens at 9am.")];
        let generated = generator(Some("Opens 9am [Source: OPD Guide]."))
            .generate("When does OPD open?", &flags(&[]), &chunks)
            .await;
        assert_eq!(generated.route, AnswerRoute::Grounded);
        assert_eq!(generated.citations, vec!["opd.md".to_string()]);
        assert_eq!(generated.follow_ups.len(), 2);
        assert!(generated.generation_succeeded);
    }

    #[tokio::test]
    async fn advice_flag_appends_disclaimer() {
        let generated = generator(Some("Drink fluids and rest."))
            .generate("what should i do for a cold", &flags(&[SafetyFlag::MedicalAdvice]), &[])
            .await;
        assert!(generated.answer.contains("not medical advice"));
    }

    #[tokio::test]
    async fn generation_failure_degrades_to_fallback() {
        let chunks = vec![retrieved("opd.md", "OPD Guide", "OPD opens at 9am.")];
        let generated = generator(None)
            .generate("When does OPD open?", &flags(&[SafetyFlag::MedicalAdvice]), &chunks)
            .await;
        assert!(!generated.generation_succeeded);
        assert!(generated.answer.contains("having trouble answering"));
        // The flag still shapes the degraded answer.
        assert!(generated.answer.contains("not medical advice"));
        assert!(generated.citations.is_empty());
    }
}
