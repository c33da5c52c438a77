//! Repository for the `user_preferences` table.

use sqlx::PgPool;

use crate::models::preference::UserPreference;

/// Column list for `user_preferences` queries.
const COLUMNS: &str = "user_id, category, updated_at";

/// Provides read and upsert operations for user preferences.
pub struct PreferenceRepo;

impl PreferenceRepo {
    /// Current preference for a user, if any.
    pub async fn find(pool: &PgPool, user_id: &str) -> Result<Option<UserPreference>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_preferences WHERE user_id = $1");
        sqlx::query_as::<_, UserPreference>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or overwrite the user's preference (last write wins).
    pub async fn upsert(
        pool: &PgPool,
        user_id: &str,
        category: &str,
    ) -> Result<UserPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_preferences (user_id, category, updated_at) \
             VALUES ($1, $2, NOW()) \
             ON CONFLICT (user_id) DO UPDATE \
             SET category = EXCLUDED.category, updated_at = EXCLUDED.updated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserPreference>(&query)
            .bind(user_id)
            .bind(category)
            .fetch_one(pool)
            .await
    }
}
