//! Recipe catalog rows.

use chefmatch_core::recommendation::CatalogEntry;
use chefmatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `recipes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Recipe {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub cooking_time_minutes: Option<i32>,
    pub created_at: Timestamp,
}

impl From<Recipe> for CatalogEntry {
    fn from(recipe: Recipe) -> Self {
        CatalogEntry {
            id: recipe.id,
            name: recipe.name,
            category: recipe.category,
            cooking_time_minutes: recipe.cooking_time_minutes,
        }
    }
}
