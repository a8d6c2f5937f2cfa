//! Route definitions for the HTTP API

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::HttpConfig;
use crate::AppState;

use super::api;

/// Create the main router with all routes
pub fn create_router(app_state: Arc<AppState>, config: &HttpConfig) -> Router {
    let cors = if config.cors_enabled {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers([api::WORD_TIMINGS_HEADER])
    } else {
        CorsLayer::new()
    };

    Router::new()
        // Read-only state
        .route("/api/status", get(api::get_status))
        .route("/api/state", get(api::get_state))
        .route("/api/presets", get(api::get_presets))
        // Avatar commands
        .route("/api/control", post(api::set_control))
        .route("/api/expression", post(api::apply_expression))
        .route("/api/bone", post(api::set_bone))
        .route("/api/pose", post(api::apply_pose))
        .route("/api/animation", post(api::play_animation))
        // Speech
        .route("/api/tts", post(api::text_to_speech))
        // SSE frame stream for renderers
        .route("/api/stream", get(api::frame_stream))
        // Static files
        .nest_service("/static", ServeDir::new(&config.static_dir))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
