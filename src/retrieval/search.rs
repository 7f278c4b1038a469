//! Chunk scoring and ranking

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use crate::config::{RetrievalConfig, ScorerKind};
use crate::error::{Error, Result};
use crate::knowledge::KnowledgeIndex;
use crate::providers::EmbeddingProvider;
use crate::safety::normalize;
use crate::types::DocumentChunk;

/// A chunk paired with its relevance score for one query; never persisted
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    /// The retrieved chunk
    pub chunk: DocumentChunk,
    /// Relevance score in [0, 1], higher is better
    pub score: f32,
}

/// Tokens too common to carry relevance signal
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "can", "could", "do", "does", "for", "how",
    "i", "in", "is", "it", "me", "my", "of", "on", "or", "that", "the", "this", "to", "was",
    "were", "what", "when", "where", "which", "who", "why", "with", "you",
];

fn content_tokens(text: &str) -> HashSet<String> {
    normalize(text)
        .unicode_words()
        .filter(|w| w.len() > 1 && !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Fraction of the query's content tokens found in the chunk
fn lexical_score(query_tokens: &HashSet<String>, chunk_tokens: &HashSet<String>) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let matched = query_tokens.intersection(chunk_tokens).count();
    matched as f32 / query_tokens.len() as f32
}

/// Cosine similarity clamped to [0, 1]; negative similarity is irrelevance
fn cosine_score(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Retrieval engine over the immutable knowledge index
pub struct Retriever {
    index: Arc<KnowledgeIndex>,
    /// Precomputed per-chunk token sets for the lexical scorer
    chunk_tokens: Vec<HashSet<String>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    scorer: ScorerKind,
    top_k: usize,
    min_relevance: f32,
    /// Number of retrieve() invocations, observable in tests
    calls: AtomicU64,
}

impl Retriever {
    /// Create a retriever
    ///
    /// The embedding scorer requires both a provider and an index built with
    /// embeddings; both are checked at construction time.
    pub fn new(
        config: &RetrievalConfig,
        index: Arc<KnowledgeIndex>,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Result<Self> {
        if config.scorer == ScorerKind::Embedding {
            if embedder.is_none() {
                return Err(Error::config(
                    "embedding scorer selected but no embedding provider configured",
                ));
            }
            if index.embeddings().is_none() {
                return Err(Error::config(
                    "embedding scorer selected but index was built without embeddings",
                ));
            }
        }

        let chunk_tokens = index
            .chunks()
            .iter()
            .map(|c| content_tokens(&format!("{} {}", c.title, c.text)))
            .collect();

        Ok(Self {
            index,
            chunk_tokens,
            embedder,
            scorer: config.scorer,
            top_k: config.top_k,
            min_relevance: config.min_relevance,
            calls: AtomicU64::new(0),
        })
    }

    /// Rank chunks by relevance to the query
    ///
    /// Returns at most `top_k` chunks scoring at least the minimum-relevance
    /// threshold, sorted by score descending. Ties break toward the more
    /// recently updated document, then the lexicographically smaller chunk id,
    /// so identical queries always rank identically.
    pub async fn retrieve(&self, query_text: &str) -> Result<Vec<RetrievedChunk>> {
        self.calls.fetch_add(1, AtomicOrdering::Relaxed);

        let scores = match self.scorer {
            ScorerKind::Lexical => self.lexical_scores(query_text),
            ScorerKind::Embedding => self.embedding_scores(query_text).await?,
        };

        let mut results: Vec<RetrievedChunk> = self
            .index
            .chunks()
            .iter()
            .zip(scores)
            .filter(|(_, score)| *score >= self.min_relevance)
            .map(|(chunk, score)| RetrievedChunk {
                chunk: chunk.clone(),
                score,
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| b.chunk.updated_at.cmp(&a.chunk.updated_at))
                .then_with(|| a.chunk.chunk_id.cmp(&b.chunk.chunk_id))
        });
        results.truncate(self.top_k);

        tracing::debug!(
            "retrieved {} chunk(s) above threshold {}",
            results.len(),
            self.min_relevance
        );

        Ok(results)
    }

    fn lexical_scores(&self, query_text: &str) -> Vec<f32> {
        let query_tokens = content_tokens(query_text);
        self.chunk_tokens
            .iter()
            .map(|tokens| lexical_score(&query_tokens, tokens))
            .collect()
    }

    async fn embedding_scores(&self, query_text: &str) -> Result<Vec<f32>> {
        let embedder = self
            .embedder
            .as_ref()
            .ok_or_else(|| Error::retrieval("no embedding provider"))?;
        let embeddings = self
            .index
            .embeddings()
            .ok_or_else(|| Error::retrieval("index has no embeddings"))?;

        let query_embedding = embedder
            .embed(query_text)
            .await
            .map_err(|e| Error::retrieval(format!("query embedding failed: {}", e)))?;

        Ok(embeddings
            .iter()
            .map(|chunk_embedding| cosine_score(&query_embedding, chunk_embedding))
            .collect())
    }

    /// How many times retrieval has been invoked
    pub fn call_count(&self) -> u64 {
        self.calls.load(AtomicOrdering::Relaxed)
    }
}
