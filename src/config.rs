//! Configuration for the chat pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main chat pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// LLM backend configuration
    pub llm: LlmConfig,
    /// Knowledge corpus configuration
    pub knowledge: KnowledgeConfig,
}

impl ChatConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Invalid configuration is fatal: the process must refuse to accept
    /// queries rather than run with broken thresholds or a missing backend.
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.retrieval.min_relevance) {
            return Err(Error::config("retrieval.min_relevance must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.retrieval.high_confidence) {
            return Err(Error::config("retrieval.high_confidence must be in [0, 1]"));
        }
        if self.retrieval.high_confidence < self.retrieval.min_relevance {
            return Err(Error::config(
                "retrieval.high_confidence must not be below retrieval.min_relevance",
            ));
        }
        if self.llm.generate_model.trim().is_empty() {
            return Err(Error::config("llm.generate_model must not be empty"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::config("llm.timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

/// How chunk relevance is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// Deterministic token-overlap scoring, no external calls
    Lexical,
    /// Cosine similarity over embeddings from the configured provider
    Embedding,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query
    pub top_k: usize,
    /// Minimum relevance score; chunks below this are excluded entirely
    pub min_relevance: f32,
    /// Top score at or above this yields high confidence
    pub high_confidence: f32,
    /// Scoring backend
    pub scorer: ScorerKind,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_relevance: 0.25,
            high_confidence: 0.65,
            scorer: ScorerKind::Lexical,
        }
    }
}

/// LLM backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmBackend {
    /// Local Ollama server
    Ollama,
    /// Google Gemini REST API (API key)
    Gemini,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which backend to use
    pub backend: LlmBackend,
    /// Ollama base URL
    pub base_url: String,
    /// Generation model name
    pub generate_model: String,
    /// Embedding model name (embedding scorer only)
    pub embed_model: String,
    /// Environment variable holding the Gemini API key
    pub api_key_env: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::Ollama,
            base_url: "http://localhost:11434".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            temperature: 0.3,
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

/// Knowledge corpus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Path to the chunked document corpus (JSON)
    pub corpus_path: PathBuf,
    /// Path to the static reference data: contacts, taxonomy, follow-ups (JSON)
    pub reference_path: PathBuf,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/hospital_corpus.json"),
            reference_path: PathBuf::from("data/reference.json"),
        }
    }
}
