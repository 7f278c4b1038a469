//! Per-query orchestration of the chat pipeline

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ChatConfig;
use crate::confidence::ConfidenceScorer;
use crate::error::{Error, Result};
use crate::generation::ResponseGenerator;
use crate::knowledge::{KnowledgeIndex, ReferenceData, TopicCategory};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::Retriever;
use crate::safety::{self, SafetyFlag};
use crate::types::{ChatRequest, ChatResponse, Query};

/// Queries longer than this are rejected as malformed
const MAX_QUERY_CHARS: usize = 2000;

/// The query pipeline
///
/// Stateless across calls apart from read-only handles to the knowledge
/// index and static reference data, so any number of queries can be in
/// flight concurrently without locking.
pub struct ChatService {
    retriever: Retriever,
    generator: ResponseGenerator,
    scorer: ConfidenceScorer,
    reference: Arc<ReferenceData>,
}

impl ChatService {
    /// Assemble the pipeline; configuration problems are fatal here, before
    /// any query is accepted.
    pub fn new(
        config: &ChatConfig,
        index: Arc<KnowledgeIndex>,
        reference: Arc<ReferenceData>,
        llm: Arc<dyn LlmProvider>,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Result<Self> {
        config.validate()?;
        let retriever = Retriever::new(&config.retrieval, index, embedder)?;
        let generator = ResponseGenerator::new(llm, reference.clone());
        let scorer = ConfidenceScorer::new(config.retrieval.high_confidence);

        Ok(Self {
            retriever,
            generator,
            scorer,
            reference,
        })
    }

    /// Process one query into a structured response
    ///
    /// Only validation errors surface to the caller. Retrieval and generation
    /// failures are recovered into a degraded but well-formed response, and
    /// the safety classification is computed first and never dropped.
    pub async fn process(&self, query: &Query) -> Result<ChatResponse> {
        let text = query.text.trim();
        if text.is_empty() {
            return Err(Error::validation("query text is empty"));
        }
        if text.chars().count() > MAX_QUERY_CHARS {
            return Err(Error::validation(format!(
                "query text exceeds {} characters",
                MAX_QUERY_CHARS
            )));
        }

        let flags = safety::classify(text);

        // Emergency and PHI queries short-circuit retrieval: the former gets
        // fixed guidance, the latter must never surface corpus content.
        let retrieved = if flags.contains(&SafetyFlag::Emergency)
            || flags.contains(&SafetyFlag::PhiRequest)
        {
            Vec::new()
        } else {
            match self.retriever.retrieve(text).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!("retrieval unavailable, degrading to no chunks: {}", e);
                    Vec::new()
                }
            }
        };

        let generated = self.generator.generate(text, &flags, &retrieved).await;
        let confidence = self
            .scorer
            .score(&flags, &retrieved, generated.generation_succeeded);

        tracing::info!(
            "processed query: route={:?} flags={:?} chunks={} confidence={:?}",
            generated.route,
            flags,
            retrieved.len(),
            confidence
        );

        Ok(ChatResponse::new(
            generated.answer,
            confidence,
            generated.citations,
            &flags,
            generated.follow_ups,
        ))
    }

    /// Process an inbound request from the presentation layer
    pub async fn process_chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.process(&Query::from(request)).await
    }

    /// The topic taxonomy, verbatim, for display
    pub fn available_topics(&self) -> &[TopicCategory] {
        &self.reference.taxonomy
    }

    /// The emergency contact directory, verbatim, for display
    pub fn emergency_contacts(&self) -> &BTreeMap<String, String> {
        &self.reference.emergency_contacts
    }

    /// How many times retrieval has run, for tests and diagnostics
    pub fn retrieval_calls(&self) -> u64 {
        self.retriever.call_count()
    }
}
