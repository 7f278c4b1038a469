//! Relevance-ranked chunk retrieval over the knowledge index

pub mod search;

pub use search::{RetrievedChunk, Retriever};
