//! Document chunk type with source tracking for citations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chunk of a source document, the unit of retrieval
///
/// Owned exclusively by the knowledge index and read-only after the index is
/// built. `source_id` is what appears in response citations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Stable chunk identifier, unique within the index
    pub chunk_id: String,
    /// Identifier of the source document (used in citations)
    pub source_id: String,
    /// Human-readable source document title
    pub title: String,
    /// Topic category from the taxonomy (e.g. "appointments")
    pub category: String,
    /// Text content
    pub text: String,
    /// When the source document was last updated
    pub updated_at: DateTime<Utc>,
}

impl DocumentChunk {
    /// Format the chunk's source for inline citation markers
    pub fn format_citation(&self) -> String {
        format!("[Source: {}]", self.title)
    }
}
