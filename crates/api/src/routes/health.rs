//! Liveness and pipeline status.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use chefmatch_db::repositories::QueueRepo;
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database cannot be reached.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Preference events not yet consumed (or dead-lettered). `null` when
    /// the queue could not be read.
    pub pending_events: Option<i64>,
    /// Event consumers this process runs alongside the HTTP server.
    pub in_process_consumers: usize,
}

/// GET /health -- database reachability plus the preference queue backlog.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = chefmatch_db::health_check(&state.pool).await.is_ok();

    let pending_events = if db_healthy {
        match QueueRepo::count_pending(&state.pool, &state.config.worker.topic).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to count pending preference events");
                None
            }
        }
    } else {
        None
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        pending_events,
        in_process_consumers: state.config.worker.concurrency,
    })
}

/// Mount `/health` (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
