//! Handlers for the `/recommendations` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::state::AppState;

/// Query parameters for the recommendation read.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationParams {
    /// Preview this category instead of serving the user's cached set.
    pub category: Option<String>,
}

/// GET /api/v1/recommendations/{user_id}[?category=X]
///
/// Always 200 with a bare array of recipe names. Missing data and
/// downstream failures come back as a one-element placeholder array.
pub async fn get_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendationParams>,
) -> Json<Vec<String>> {
    let result = state
        .query
        .get_recommendations(user_id.trim(), params.category.as_deref())
        .await;

    tracing::debug!(
        user_id = %user_id,
        source = ?result.source,
        count = result.names.len(),
        "Recommendations served",
    );

    Json(result.names)
}
