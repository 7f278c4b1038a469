//! Immutable chunk index built from the document corpus

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::DocumentChunk;

/// Corpus file layout: source documents pre-segmented into chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusFile {
    pub documents: Vec<CorpusDocument>,
}

/// One source document in the corpus file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub source_id: String,
    pub title: String,
    pub category: String,
    pub updated_at: DateTime<Utc>,
    pub chunks: Vec<CorpusChunk>,
}

/// One chunk of a corpus document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusChunk {
    pub chunk_id: String,
    pub text: String,
}

/// Process-wide store of document chunks
///
/// Built once at startup; no writer exists afterwards, so reads need no
/// locking. Embeddings are optional and only present when the embedding
/// scorer is configured.
pub struct KnowledgeIndex {
    chunks: Vec<DocumentChunk>,
    by_id: HashMap<String, usize>,
    embeddings: Option<Vec<Vec<f32>>>,
}

impl KnowledgeIndex {
    /// Build an index from already-assembled chunks
    pub fn from_chunks(chunks: Vec<DocumentChunk>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            if chunk.text.trim().is_empty() {
                return Err(Error::corpus(format!(
                    "chunk '{}' has empty text",
                    chunk.chunk_id
                )));
            }
            if by_id.insert(chunk.chunk_id.clone(), i).is_some() {
                return Err(Error::corpus(format!(
                    "duplicate chunk id '{}'",
                    chunk.chunk_id
                )));
            }
        }
        Ok(Self {
            chunks,
            by_id,
            embeddings: None,
        })
    }

    /// Build an index from a corpus JSON file
    pub fn from_corpus_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let corpus: CorpusFile = serde_json::from_str(&raw)?;
        Self::from_corpus(corpus)
    }

    /// Flatten a parsed corpus into an index
    pub fn from_corpus(corpus: CorpusFile) -> Result<Self> {
        let mut chunks = Vec::new();
        for doc in corpus.documents {
            for chunk in doc.chunks {
                chunks.push(DocumentChunk {
                    chunk_id: chunk.chunk_id,
                    source_id: doc.source_id.clone(),
                    title: doc.title.clone(),
                    category: doc.category.clone(),
                    text: chunk.text,
                    updated_at: doc.updated_at,
                });
            }
        }
        if chunks.is_empty() {
            return Err(Error::corpus("corpus contains no chunks"));
        }
        Self::from_chunks(chunks)
    }

    /// Compute and attach chunk embeddings via the given provider
    ///
    /// Called once during startup when the embedding scorer is configured;
    /// the index stays immutable afterwards.
    pub async fn with_embeddings(mut self, provider: &dyn EmbeddingProvider) -> Result<Self> {
        let texts: Vec<String> = self.chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = provider.embed_batch(&texts).await?;
        if embeddings.len() != self.chunks.len() {
            return Err(Error::Internal(format!(
                "embedding count mismatch: {} chunks, {} embeddings",
                self.chunks.len(),
                embeddings.len()
            )));
        }
        self.embeddings = Some(embeddings);
        Ok(self)
    }

    /// All chunks, in corpus order
    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    /// Chunk embeddings, if computed at build time
    pub fn embeddings(&self) -> Option<&[Vec<f32>]> {
        self.embeddings.as_deref()
    }

    /// Look up a chunk by its identifier
    pub fn get(&self, chunk_id: &str) -> Option<&DocumentChunk> {
        self.by_id.get(chunk_id).map(|&i| &self.chunks[i])
    }

    /// Number of chunks in the index
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
