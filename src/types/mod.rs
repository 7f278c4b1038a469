//! Core types for the chat pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::DocumentChunk;
pub use query::{ChatRequest, Query};
pub use response::{ChatResponse, ConfidenceLevel};
