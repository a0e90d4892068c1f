use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::speech::VoiceCapture;
use crate::webhook::{WebhookClient, WebhookError};

use super::config::SessionConfig;
use super::message::ChatMessage;
use super::stats::SessionStats;

/// Request lifecycle of a session: one request in flight at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Processing,
    Success,
    Error,
}

/// A chat session: message log, request state machine and the draft input
/// that dictation feeds into.
pub struct ChatSession {
    config: SessionConfig,
    webhook: WebhookClient,
    started_at: chrono::DateTime<Utc>,
    state: Mutex<SessionState>,
    messages: Mutex<Vec<ChatMessage>>,
    draft: Mutex<String>,
}

impl ChatSession {
    pub fn new(config: SessionConfig, webhook: WebhookClient) -> Self {
        info!("Creating chat session: {}", config.session_id);

        Self {
            config,
            webhook,
            started_at: Utc::now(),
            state: Mutex::new(SessionState::Idle),
            messages: Mutex::new(Vec::new()),
            draft: Mutex::new(String::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.config.session_id
    }

    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().await.clone()
    }

    pub async fn draft(&self) -> String {
        self.draft.lock().await.clone()
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        *self.draft.lock().await = text.into();
    }

    /// Append the capture's transcript to the draft input and clear the
    /// capture for the next dictation.
    pub async fn absorb_dictation(&self, capture: &VoiceCapture) {
        let transcript = capture.transcript().await;
        let trimmed = transcript.trim();

        if !trimmed.is_empty() {
            let mut draft = self.draft.lock().await;
            if !draft.is_empty() && !draft.ends_with(' ') {
                draft.push(' ');
            }
            draft.push_str(trimmed);
        }

        capture.clear_transcript().await;
    }

    /// Submit input to the webhook.
    ///
    /// Returns `Ok(None)` when the submit was ignored: empty input, or a
    /// request already in flight. On success the assistant's message is
    /// appended to the log and returned.
    pub async fn submit(&self, input: &str) -> Result<Option<ChatMessage>, WebhookError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        {
            let mut state = self.state.lock().await;
            if *state == SessionState::Processing {
                warn!("Submit ignored: request already in flight");
                return Ok(None);
            }
            *state = SessionState::Processing;
        }

        self.push(ChatMessage::user(trimmed)).await;

        match self.webhook.submit(trimmed).await {
            Ok(reply) => {
                let message = ChatMessage::assistant(reply);
                self.push(message.clone()).await;
                *self.state.lock().await = SessionState::Success;
                Ok(Some(message))
            }
            Err(e) => {
                error!("Discovery request failed: {}", e);
                *self.state.lock().await = SessionState::Error;
                Err(e)
            }
        }
    }

    /// Submit the accumulated draft, clearing it first. `Ok(None)` when
    /// the draft was empty or a request is in flight.
    pub async fn submit_draft(&self) -> Result<Option<ChatMessage>, WebhookError> {
        let input = {
            let mut draft = self.draft.lock().await;
            std::mem::take(&mut *draft)
        };
        self.submit(&input).await
    }

    /// Back to a fresh session: idle, no messages, empty draft.
    pub async fn reset(&self) {
        info!("Resetting chat session: {}", self.config.session_id);
        *self.state.lock().await = SessionState::Idle;
        self.messages.lock().await.clear();
        self.draft.lock().await.clear();
    }

    pub async fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionStats {
            state: *self.state.lock().await,
            started_at: self.started_at,
            uptime_secs: duration.num_milliseconds() as f64 / 1000.0,
            message_count: self.messages.lock().await.len(),
        }
    }

    async fn push(&self, message: ChatMessage) {
        self.messages.lock().await.push(message);
    }
}
