//! External model capabilities as fallible, timeout-bounded providers

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use gemini::GeminiClient;
pub use llm::LlmProvider;
pub use ollama::OllamaClient;

use std::sync::Arc;

use crate::config::{LlmBackend, LlmConfig};
use crate::error::{Error, Result};

/// Build the configured LLM provider
///
/// Missing credentials are a startup failure, not a per-query one.
pub fn llm_from_config(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    match config.backend {
        LlmBackend::Ollama => Ok(Arc::new(OllamaClient::new(config))),
        LlmBackend::Gemini => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                Error::config(format!(
                    "Gemini backend selected but {} is not set",
                    config.api_key_env
                ))
            })?;
            Ok(Arc::new(GeminiClient::new(api_key, config)))
        }
    }
}
