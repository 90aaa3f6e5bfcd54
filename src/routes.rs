use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/api/health", get(handlers::health_check))
        // Conversation relay
        .route("/transcribe", post(handlers::transcribe))
        .route("/generate_response", post(handlers::generate_response))
        .route("/tts", post(handlers::tts))
}
