//! HTTP router construction.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::state::AppState;

/// Build the application router. The static `status` segment wins over the
/// `{start_season}` capture, so the poller never collides with the trigger
/// route.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/augment/status/{request_id}", get(api::augment_status))
        .route("/augment/{start_season}/{end_season}", get(api::augment))
        .route("/augmentArticles", get(api::augment_articles))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
