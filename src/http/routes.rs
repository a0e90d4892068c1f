use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Conversation control
        .route("/conversations", post(handlers::create_conversation))
        .route(
            "/conversations/:conversation_id/messages",
            post(handlers::send_message).get(handlers::get_messages),
        )
        .route(
            "/conversations/:conversation_id/status",
            get(handlers::get_status),
        )
        .route(
            "/conversations/:conversation_id/reset",
            post(handlers::reset_conversation),
        )
        // Request logging + permissive CORS for the widget frontend
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
