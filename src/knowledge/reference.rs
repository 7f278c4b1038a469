//! Static reference data: emergency contacts, topic taxonomy, follow-up map

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

/// One taxonomy entry: a category and the topics it covers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicCategory {
    pub category: String,
    pub topics: Vec<String>,
}

/// Process-wide read-only reference data loaded at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
    /// Service name to contact string (ambulance, emergency desk, ...)
    pub emergency_contacts: BTreeMap<String, String>,
    /// Ordered list of topic categories for display
    pub taxonomy: Vec<TopicCategory>,
    /// Topic category to suggested follow-up questions
    pub follow_ups: BTreeMap<String, Vec<String>>,
}

impl ReferenceData {
    /// Load reference data from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Follow-up questions for a topic category, empty if none are mapped
    pub fn follow_ups_for(&self, category: &str) -> &[String] {
        self.follow_ups
            .get(category)
            .map(|q| q.as_slice())
            .unwrap_or(&[])
    }
}
