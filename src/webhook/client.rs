use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::config::WebhookConfig;

use super::types::{AssistantReply, DiscoveryRequest, WebhookResponse};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("network error while contacting webhook: {0}")]
    Network(#[from] reqwest::Error),

    #[error("webhook request failed with status {status}")]
    RequestFailed { status: u16 },

    #[error("webhook returned an unrecognized body: {0}")]
    Decode(String),
}

/// Client for the discovery webhook.
///
/// Every failure is terminal for that attempt; there is no retry logic
/// anywhere in this path.
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(config: &WebhookConfig) -> Result<Self, WebhookError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url.clone(),
        })
    }

    /// POST the user's input and normalize the reply.
    ///
    /// Any 2xx JSON body must match the canonical schema; any other 2xx
    /// body is taken verbatim as a plain-text reply.
    pub async fn submit(&self, input: &str) -> Result<AssistantReply, WebhookError> {
        info!("Submitting discovery input ({} chars)", input.len());

        let response = self
            .http
            .post(&self.url)
            .json(&DiscoveryRequest {
                input: input.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::RequestFailed {
                status: status.as_u16(),
            });
        }

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("application/json"))
            .unwrap_or(false);

        let body = response.text().await?;

        if is_json {
            let parsed: WebhookResponse =
                serde_json::from_str(&body).map_err(|e| WebhookError::Decode(e.to_string()))?;
            Ok(parsed.into())
        } else {
            Ok(AssistantReply::from_text(body))
        }
    }
}
