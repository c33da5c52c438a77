//! Handlers for `/users/{user_id}/preferences`.
//!
//! Updating a preference stores it and then publishes a
//! `PreferenceChanged` event; regeneration happens asynchronously in the
//! event consumers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chefmatch_core::category;
use chefmatch_core::error::CoreError;
use chefmatch_core::events::PreferenceChanged;
use chefmatch_db::models::preference::UpdatePreference;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A user's current favorite category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceResponse {
    pub user_id: String,
    pub category: String,
}

fn require_user_id(user_id: &str) -> AppResult<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("user id must not be empty".into()));
    }
    Ok(trimmed)
}

/// GET /api/v1/users/{user_id}/preferences
pub async fn get_preference(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<DataResponse<PreferenceResponse>>> {
    let user_id = require_user_id(&user_id)?;

    let category = state
        .preferences
        .current_preference(user_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Preference",
            id: user_id.to_string(),
        })?;

    Ok(Json(DataResponse {
        data: PreferenceResponse {
            user_id: user_id.to_string(),
            category,
        },
    }))
}

/// POST /api/v1/users/{user_id}/preferences
///
/// Responds 202: the preference is stored, recommendations follow once a
/// consumer handles the event.
pub async fn update_preference(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(input): Json<UpdatePreference>,
) -> AppResult<(StatusCode, Json<DataResponse<PreferenceChanged>>)> {
    let user_id = require_user_id(&user_id)?;
    let category = category::validate(&input.category)?;

    state.preferences.set_preference(user_id, category).await?;

    let event = PreferenceChanged::new(user_id, category);
    state.publisher.publish(&event).await?;

    tracing::info!(user_id, category, "Preference updated");

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: event })))
}
