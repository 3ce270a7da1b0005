//! HTTP handlers: job triggers, the status poller, and health.
//!
//! Trigger endpoints return the fresh job id as a plain-text body and never
//! block on the job itself; the spawned task owns the run end to end.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::jobs::{ArticleJob, JobHandle, PurchaseJob};
use crate::state::AppState;

pub const NOT_FOUND_STATUS: &str = "Request Not Found.";

/// `GET /augment/{start_season}/{end_season}` — start a summarize-then-embed
/// job over one season relationship range.
pub async fn augment(
    State(state): State<Arc<AppState>>,
    Path((start_season, end_season)): Path<(String, String)>,
) -> String {
    let id = Uuid::new_v4().to_string();
    let handle = JobHandle::new();
    state.registry.insert(id.clone(), handle.clone());

    let job = PurchaseJob::new(
        state.store.clone(),
        state.summarizer.clone(),
        state.embedder.clone(),
        state.batch_size,
        start_season.clone(),
        end_season.clone(),
    );
    info!(
        "starting purchase augment job {} ({}..{})",
        id, start_season, end_season
    );
    tokio::spawn(async move { job.run(&handle).await });

    id
}

/// `GET /augmentArticles` — start a batched direct-embed job over all
/// unembedded article nodes.
pub async fn augment_articles(State(state): State<Arc<AppState>>) -> String {
    let id = Uuid::new_v4().to_string();
    let handle = JobHandle::new();
    state.registry.insert(id.clone(), handle.clone());

    let job = ArticleJob::new(state.store.clone(), state.embedder.clone(), state.batch_size);
    info!("starting article augment job {}", id);
    tokio::spawn(async move { job.run(&handle).await });

    id
}

/// `GET /augment/status/{request_id}` — percent-complete string, or
/// "Request Not Found." once the completed job has been observed (or the id
/// was never known).
pub async fn augment_status(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<String>,
) -> String {
    state
        .registry
        .status(&request_id)
        .unwrap_or_else(|| NOT_FOUND_STATUS.to_string())
}

// ── Health ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub active_jobs: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_jobs: state.registry.len(),
    })
}
