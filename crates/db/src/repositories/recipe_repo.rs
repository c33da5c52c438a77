//! Read-only queries over the `recipes` catalog.

use sqlx::PgPool;

use crate::models::recipe::Recipe;

/// Column list for `recipes` SELECT queries.
const COLUMNS: &str = "id, name, category, description, cooking_time_minutes, created_at";

/// Provides catalog queries. Results are always in catalog order (`id ASC`).
pub struct RecipeRepo;

impl RecipeRepo {
    /// Every recipe in the catalog.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Recipe>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recipes ORDER BY id ASC");
        sqlx::query_as::<_, Recipe>(&query).fetch_all(pool).await
    }

    /// Insert a recipe. Used to seed catalogs in tests and tooling.
    pub async fn insert(
        pool: &PgPool,
        name: &str,
        category: &str,
        cooking_time_minutes: Option<i32>,
    ) -> Result<Recipe, sqlx::Error> {
        let query = format!(
            "INSERT INTO recipes (name, category, cooking_time_minutes) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Recipe>(&query)
            .bind(name)
            .bind(category)
            .bind(cooking_time_minutes)
            .fetch_one(pool)
            .await
    }
}
