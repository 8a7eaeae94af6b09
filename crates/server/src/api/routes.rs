use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, sessions};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config().server.max_upload_bytes;

    // API routes
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Sessions
        .route("/sessions", post(sessions::upload))
        .route("/sessions/{id}/status", get(sessions::status))
        .route("/sessions/{id}/files", get(sessions::list_files))
        .route("/sessions/{id}/files/{name}", get(sessions::get_file))
        .route("/sessions/{id}/complete", post(sessions::complete))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
