//! Repository for `recommendation_sets` and `recommendation_items`.
//!
//! A user's set is replaced wholesale inside one transaction. The set row is
//! upserted first so its row lock serializes concurrent writers for the same
//! user; the items are then deleted and re-inserted. Reads use a single
//! joined statement, so a reader sees either the old or the new set.

use chefmatch_core::recommendation::RecommendationSet;
use chefmatch_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::recommendation::{assemble_set, RecommendationRow};

/// Columns bound per item in the multi-row INSERT.
const ITEM_PARAMS: usize = 5;

/// Provides replace/read/purge operations for recommendation sets.
pub struct RecommendationRepo;

impl RecommendationRepo {
    /// The stored set for a user, regardless of age.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: &str,
    ) -> Result<Option<RecommendationSet>, sqlx::Error> {
        let rows = sqlx::query_as::<_, RecommendationRow>(
            "SELECT s.user_id, s.category, s.generated_at, \
                    i.rank, i.recipe_id, i.recipe_name, i.score \
             FROM recommendation_sets s \
             JOIN recommendation_items i ON i.user_id = s.user_id \
             WHERE s.user_id = $1 \
             ORDER BY i.rank ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(assemble_set(rows))
    }

    /// Atomically replace the user's set with `set`.
    pub async fn replace(pool: &PgPool, set: &RecommendationSet) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO recommendation_sets (user_id, category, generated_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE \
             SET category = EXCLUDED.category, generated_at = EXCLUDED.generated_at",
        )
        .bind(&set.user_id)
        .bind(&set.category)
        .bind(set.generated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM recommendation_items WHERE user_id = $1")
            .bind(&set.user_id)
            .execute(&mut *tx)
            .await?;

        if !set.items.is_empty() {
            let query = build_item_insert(set.items.len());
            let mut q = sqlx::query(&query);
            for (rank, item) in set.items.iter().enumerate() {
                q = q
                    .bind(&set.user_id)
                    .bind(i16::try_from(rank).unwrap_or(i16::MAX))
                    .bind(item.recipe_id)
                    .bind(&item.recipe_name)
                    .bind(item.score);
            }
            q.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete every set generated before `cutoff`. Items cascade.
    pub async fn delete_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recommendation_sets WHERE generated_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Build a multi-row INSERT for `count` items.
fn build_item_insert(count: usize) -> String {
    let mut query = String::from(
        "INSERT INTO recommendation_items (user_id, rank, recipe_id, recipe_name, score) VALUES ",
    );

    let mut param_idx = 1usize;
    for i in 0..count {
        if i > 0 {
            query.push_str(", ");
        }
        query.push('(');
        for j in 0..ITEM_PARAMS {
            if j > 0 {
                query.push_str(", ");
            }
            query.push('$');
            query.push_str(&param_idx.to_string());
            param_idx += 1;
        }
        query.push(')');
    }

    query
}
