//! Router configuration for the Web API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{add_entry, get_entries, send_digest, AppState};
use super::middleware::{require_api_key, ApiKeyState};

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, api_key: &str) -> Router {
    let key_state = Arc::new(ApiKeyState::new(api_key));

    let api_routes = Router::new()
        .route("/entries", get(get_entries).put(add_entry))
        .route("/digest", post(send_digest))
        .layer(middleware::from_fn_with_state(key_state, require_api_key))
        .with_state(app_state);

    Router::new()
        .nest("/api", api_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
