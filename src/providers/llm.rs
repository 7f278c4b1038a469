//! LLM provider trait for answer generation

use async_trait::async_trait;

use crate::error::Result;

/// Trait for LLM-based text generation
///
/// Implementations:
/// - `OllamaClient`: local Ollama server (llama3.2, phi3, ...)
/// - `GeminiClient`: Google Gemini REST API
///
/// Calls are bounded by the configured timeout and retried a bounded number
/// of times; the final failure surfaces as `Error::Llm` so callers can take
/// the degraded-answer path without exception-style control flow.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for the given prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model in use
    fn model(&self) -> &str;
}
