use serde::{Deserialize, Serialize};

/// Configuration for a chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique conversation identifier
    pub session_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("conversation-{}", uuid::Uuid::new_v4()),
        }
    }
}
