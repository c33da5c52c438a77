//! Deterministic ranking of catalog entries for a category.
//!
//! Earlier catalog entries rank higher: the i-th match (0-indexed, in
//! catalog iteration order) scores `BASE_SCORE - SCORE_STEP * i`. The same
//! catalog snapshot and category always produce the same items, which is
//! what makes regeneration on duplicate events harmless.

use crate::category;
use crate::recommendation::{CatalogEntry, RecommendationItem, RecommendationSet};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on items in a recommendation set.
pub const MAX_ITEMS: usize = 5;

/// Score of the first matching catalog entry.
pub const BASE_SCORE: i32 = 100;

/// Score decrement per catalog position.
pub const SCORE_STEP: i32 = 5;

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score for the match at `position`, floored at zero.
pub fn score_for_position(position: usize) -> i32 {
    let step = i32::try_from(position)
        .unwrap_or(i32::MAX)
        .saturating_mul(SCORE_STEP);
    BASE_SCORE.saturating_sub(step).max(0)
}

/// Pick and score up to `limit` entries whose category matches `target`.
///
/// Output is sorted by descending score; the sort is stable so equal
/// scores keep catalog order.
pub fn select_items(
    entries: &[CatalogEntry],
    target: &str,
    limit: usize,
) -> Vec<RecommendationItem> {
    let target = category::normalize(target);

    let mut items: Vec<RecommendationItem> = entries
        .iter()
        .filter(|e| category::matches_normalized(&e.category, &target))
        .take(limit)
        .enumerate()
        .map(|(position, e)| RecommendationItem {
            recipe_name: e.name.clone(),
            recipe_id: e.id,
            score: score_for_position(position),
        })
        .collect();

    items.sort_by(|a, b| b.score.cmp(&a.score));
    items
}

/// Build a full set for `user_id`, or `None` when nothing matches.
pub fn build_set(
    user_id: &str,
    target: &str,
    entries: &[CatalogEntry],
    limit: usize,
    now: Timestamp,
) -> Option<RecommendationSet> {
    let items = select_items(entries, target, limit);
    if items.is_empty() {
        return None;
    }

    Some(RecommendationSet {
        user_id: user_id.to_string(),
        category: target.trim().to_string(),
        items,
        generated_at: now,
    })
}
