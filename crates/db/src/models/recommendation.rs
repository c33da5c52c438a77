//! Recommendation set rows.
//!
//! A set is stored as one `recommendation_sets` row plus its
//! `recommendation_items`. Reads join both tables in a single statement.

use chefmatch_core::recommendation::{RecommendationItem, RecommendationSet};
use chefmatch_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// One joined set + item row, ordered by `rank`.
#[derive(Debug, Clone, FromRow)]
pub struct RecommendationRow {
    pub user_id: String,
    pub category: String,
    pub generated_at: Timestamp,
    pub rank: i16,
    pub recipe_id: DbId,
    pub recipe_name: String,
    pub score: i32,
}

/// Fold rank-ordered joined rows back into a set.
///
/// Returns `None` for an empty slice.
pub fn assemble_set(rows: Vec<RecommendationRow>) -> Option<RecommendationSet> {
    let first = rows.first()?;
    let mut set = RecommendationSet {
        user_id: first.user_id.clone(),
        category: first.category.clone(),
        items: Vec::with_capacity(rows.len()),
        generated_at: first.generated_at,
    };

    set.items = rows
        .into_iter()
        .map(|r| RecommendationItem {
            recipe_name: r.recipe_name,
            recipe_id: r.recipe_id,
            score: r.score,
        })
        .collect();

    Some(set)
}
