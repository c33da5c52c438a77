//! Recommendation sets and the catalog entries they are built from.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Stored sets older than this are treated as absent.
pub const DEFAULT_TTL_DAYS: i64 = 7;

/// Shown by the category preview when the catalog has nothing for it.
pub const NO_RECIPES_PLACEHOLDER: &str = "No recipes for this category yet";

/// Shown when the user has no usable preference yet.
pub const CHOOSE_CATEGORY_PLACEHOLDER: &str = "Choose a favorite category to get recommendations";

/// Shown when a downstream collaborator failed or timed out during a read.
pub const DEGRADED_PLACEHOLDER: &str = "Explore our popular recipes";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A recipe as seen by the recommendation pipeline (read-only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub cooking_time_minutes: Option<i32>,
}

// ---------------------------------------------------------------------------
// RecommendationSet
// ---------------------------------------------------------------------------

/// One ranked recipe inside a [`RecommendationSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub recipe_name: String,
    pub recipe_id: DbId,
    pub score: i32,
}

/// The active, bounded recommendation list for a single user.
///
/// At most one set exists per user. A new set replaces the previous one
/// wholesale; sets are never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub user_id: String,
    pub category: String,
    /// Ordered by descending score.
    pub items: Vec<RecommendationItem>,
    pub generated_at: Timestamp,
}

impl RecommendationSet {
    /// Whether the set has outlived `ttl` as of `now`.
    pub fn is_expired(&self, now: Timestamp, ttl: chrono::Duration) -> bool {
        now - self.generated_at >= ttl
    }

    /// Recipe names in stored rank order.
    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|i| i.recipe_name.clone()).collect()
    }
}
