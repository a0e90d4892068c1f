use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::webhook::{AssistantReply, AudioAttachment, JobMatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One entry in a conversation's message log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,

    pub role: MessageRole,

    /// Rendered text of the message
    pub content: String,

    pub timestamp: DateTime<Utc>,

    /// Job openings carried by an assistant reply
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<JobMatch>,

    /// Audio payloads carried by an assistant reply
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio: Vec<AudioAttachment>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            jobs: Vec::new(),
            audio: Vec::new(),
        }
    }

    pub fn assistant(reply: AssistantReply) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: MessageRole::Assistant,
            content: reply.text,
            timestamp: Utc::now(),
            jobs: reply.jobs,
            audio: reply.audio,
        }
    }
}
