//! User preference rows and DTOs.

use chefmatch_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_preferences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreference {
    pub user_id: String,
    pub category: String,
    pub updated_at: Timestamp,
}

/// Request body for updating a user's favorite category.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePreference {
    pub category: String,
}
