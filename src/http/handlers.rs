use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::state::AppState;
use crate::session::{ChatMessage, ChatSession, SessionConfig, SessionStats};
use crate::webhook::WebhookClient;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    /// Optional conversation ID (if not provided, generate UUID)
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateConversationResponse {
    pub conversation_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct ResetConversationResponse {
    pub conversation_id: String,
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /conversations
/// Create a new chat session
pub async fn create_conversation(
    State(state): State<AppState>,
    Json(req): Json<CreateConversationRequest>,
) -> impl IntoResponse {
    let conversation_id = req
        .conversation_id
        .unwrap_or_else(|| format!("conversation-{}", uuid::Uuid::new_v4()));

    info!("Creating conversation: {}", conversation_id);

    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&conversation_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Conversation {} already exists", conversation_id),
                }),
            )
                .into_response();
        }
    }

    let webhook = match WebhookClient::new(&state.config.webhook) {
        Ok(webhook) => webhook,
        Err(e) => {
            error!("Failed to create webhook client: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to create webhook client: {}", e),
                }),
            )
                .into_response();
        }
    };

    let session = Arc::new(ChatSession::new(
        SessionConfig {
            session_id: conversation_id.clone(),
        },
        webhook,
    ));

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(conversation_id.clone(), session);
    }

    (
        StatusCode::OK,
        Json(CreateConversationResponse {
            conversation_id,
            status: "created".to_string(),
        }),
    )
        .into_response()
}

/// POST /conversations/:conversation_id/messages
/// Submit user input and return the assistant's reply
pub async fn send_message(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&conversation_id).cloned()
    };

    let Some(session) = session else {
        return not_found(&conversation_id);
    };

    if req.input.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "Input must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    match session.submit(&req.input).await {
        Ok(Some(message)) => (StatusCode::OK, Json(message)).into_response(),
        Ok(None) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!(
                    "Conversation {} already has a request in flight",
                    conversation_id
                ),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Message submit failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Discovery request failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /conversations/:conversation_id/messages
/// Get the full message log
pub async fn get_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&conversation_id) {
        Some(session) => {
            let messages: Vec<ChatMessage> = session.messages().await;
            (StatusCode::OK, Json(messages)).into_response()
        }
        None => not_found(&conversation_id),
    }
}

/// GET /conversations/:conversation_id/status
/// Get session statistics
pub async fn get_status(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&conversation_id) {
        Some(session) => (StatusCode::OK, Json(session.stats().await)).into_response(),
        None => not_found(&conversation_id),
    }
}

/// POST /conversations/:conversation_id/reset
/// Tear down a conversation and return its final stats
pub async fn reset_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> impl IntoResponse {
    info!("Resetting conversation: {}", conversation_id);

    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&conversation_id)
    };

    match session {
        Some(session) => {
            let stats = session.stats().await;
            session.reset().await;
            (
                StatusCode::OK,
                Json(ResetConversationResponse {
                    conversation_id,
                    status: "reset".to_string(),
                    stats,
                }),
            )
                .into_response()
        }
        None => not_found(&conversation_id),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn not_found(conversation_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Conversation {} not found", conversation_id),
        }),
    )
        .into_response()
}
