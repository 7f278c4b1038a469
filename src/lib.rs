//! careline-rag: hospital operations Q&A with safety-gated retrieval-augmented answers
//!
//! This crate implements the query pipeline of a hospital information
//! assistant: safety classification of raw queries, relevance-ranked
//! retrieval over an immutable knowledge index, grounded answer generation
//! with source citations, confidence scoring, and follow-up suggestion.
//! Emergency and personal-record queries bypass retrieval and generation
//! entirely and receive fixed protocol responses.

pub mod config;
pub mod confidence;
pub mod error;
pub mod generation;
pub mod knowledge;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod safety;
pub mod types;

pub use config::ChatConfig;
pub use error::{Error, Result};
pub use knowledge::{KnowledgeIndex, ReferenceData};
pub use pipeline::ChatService;
pub use safety::SafetyFlag;
pub use types::{
    document::DocumentChunk,
    query::{ChatRequest, Query},
    response::{ChatResponse, ConfidenceLevel},
};
