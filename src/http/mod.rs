//! HTTP API server for driving chat sessions
//!
//! This module provides a REST API for the widget frontend:
//! - POST /conversations - Create a conversation
//! - POST /conversations/:id/messages - Submit input, get the reply
//! - GET  /conversations/:id/messages - Full message log
//! - GET  /conversations/:id/status - Session statistics
//! - POST /conversations/:id/reset - Tear down a conversation
//! - GET  /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
