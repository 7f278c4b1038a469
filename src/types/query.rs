//! Query types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound request from the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The question to answer
    pub query: String,
}

/// A single user turn, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Raw query text as typed by the user
    pub text: String,
    /// Session identifier, if the presentation layer tracks one
    pub session_id: Option<Uuid>,
    /// Creation timestamp
    pub asked_at: DateTime<Utc>,
}

impl Query {
    /// Create a new query
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            session_id: None,
            asked_at: Utc::now(),
        }
    }

    /// Attach a session identifier
    pub fn with_session(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }
}

impl From<ChatRequest> for Query {
    fn from(request: ChatRequest) -> Self {
        Self::new(request.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_conversion_keeps_text() {
        let query = Query::from(ChatRequest {
            query: "What are the visiting hours?".to_string(),
        });
        assert_eq!(query.text, "What are the visiting hours?");
        assert!(query.session_id.is_none());
    }

    #[test]
    fn session_id_is_attached() {
        let session = Uuid::new_v4();
        let query = Query::new("hello").with_session(session);
        assert_eq!(query.session_id, Some(session));
    }
}
