use serde::{Deserialize, Serialize};

use crate::playback::{AudioSource, WordTiming};

/// Request body for the discovery webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    pub input: String,
}

/// Canonical webhook response schema.
///
/// One shape, decided up front; the webhook is expected to conform to it
/// rather than being shape-sniffed. Plain-text (non-JSON) 2xx bodies are
/// also accepted and become a bare text reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_response: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matching_job_openings: Vec<JobMatch>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio: Vec<AudioAttachment>,
}

/// A single job opening returned by the webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_match: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
}

/// Audio payload attached to a reply: inline base64 data or a remote
/// identifier, optionally with a transcript and word-level timings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,

    #[serde(default, rename = "wordTimings", skip_serializing_if = "Vec::is_empty")]
    pub word_timings: Vec<WordTiming>,
}

impl AudioAttachment {
    /// The playable source for this attachment, if it carries one. Inline
    /// data wins over a remote identifier.
    pub fn source(&self) -> Option<AudioSource> {
        if let Some(data) = &self.data {
            return Some(AudioSource::Inline(data.clone()));
        }
        self.id.as_ref().map(|id| AudioSource::Remote(id.clone()))
    }
}

/// Normalized reply handed to the chat session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantReply {
    pub text: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<JobMatch>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audio: Vec<AudioAttachment>,
}

impl AssistantReply {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

impl From<WebhookResponse> for AssistantReply {
    fn from(response: WebhookResponse) -> Self {
        Self {
            text: response.text_response.unwrap_or_default(),
            jobs: response.matching_job_openings,
            audio: response.audio,
        }
    }
}
