//! Router assembly: HTTP endpoints, WebSocket upgrade, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...` (player endpoints and `/api/v1/admin/...`)
/// - CORS (allow any origin/method/headers); tighten for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Player API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/users", post(http::http_register_user))
        .route("/api/v1/users/:id/progress", get(http::http_get_progress))
        .route("/api/v1/users/:id/rank", get(http::http_get_user_rank))
        .route("/api/v1/challenges", get(http::http_list_challenges))
        .route("/api/v1/challenges/:id/submit", post(http::http_submit_flag))
        .route("/api/v1/challenges/:id/history", get(http::http_get_history))
        .route("/api/v1/leaderboard", get(http::http_get_leaderboard))
        .route("/api/v1/stats", get(http::http_get_stats))
        // Admin API
        .route("/api/v1/admin/users/:id/reset", post(http::http_admin_reset_user))
        .route("/api/v1/admin/challenges/:id/reset", post(http::http_admin_reset_challenge))
        .route(
            "/api/v1/admin/challenges/:id/toggle-visibility",
            put(http::http_admin_toggle_visibility),
        )
        .route("/api/v1/admin/challenges/:id", delete(http::http_admin_delete_challenge))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
