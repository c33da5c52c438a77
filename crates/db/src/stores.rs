//! PostgreSQL implementations of the collaborator ports.

use async_trait::async_trait;
use chefmatch_core::category;
use chefmatch_core::ports::{Catalog, PortError, PreferenceStore, RecommendationStore};
use chefmatch_core::recommendation::{CatalogEntry, RecommendationSet};

use crate::repositories::{PreferenceRepo, RecipeRepo, RecommendationRepo};
use crate::DbPool;

fn unavailable(err: sqlx::Error) -> PortError {
    PortError::Unavailable(err.to_string())
}

/// Catalog backed by the `recipes` table.
#[derive(Clone)]
pub struct PgCatalog {
    pool: DbPool,
}

impl PgCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn list_by_category(&self, category: &str) -> Result<Vec<CatalogEntry>, PortError> {
        // Filtered here rather than in SQL: Postgres `btrim`/`lower` disagree
        // with `category::normalize` on tabs and non-ASCII letters.
        let target = category::normalize(category);
        let recipes = RecipeRepo::list_all(&self.pool).await.map_err(unavailable)?;
        Ok(recipes
            .into_iter()
            .filter(|r| category::matches_normalized(&r.category, &target))
            .map(CatalogEntry::from)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>, PortError> {
        let recipes = RecipeRepo::list_all(&self.pool).await.map_err(unavailable)?;
        Ok(recipes.into_iter().map(CatalogEntry::from).collect())
    }
}

/// Preference store backed by the `user_preferences` table.
#[derive(Clone)]
pub struct PgPreferenceStore {
    pool: DbPool,
}

impl PgPreferenceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn current_preference(&self, user_id: &str) -> Result<Option<String>, PortError> {
        let pref = PreferenceRepo::find(&self.pool, user_id)
            .await
            .map_err(unavailable)?;
        Ok(pref.map(|p| p.category))
    }

    async fn set_preference(&self, user_id: &str, category: &str) -> Result<(), PortError> {
        PreferenceRepo::upsert(&self.pool, user_id, category)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

/// Recommendation store backed by `recommendation_sets` / `recommendation_items`.
#[derive(Clone)]
pub struct PgRecommendationStore {
    pool: DbPool,
}

impl PgRecommendationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecommendationStore for PgRecommendationStore {
    async fn get(&self, user_id: &str) -> Result<Option<RecommendationSet>, PortError> {
        RecommendationRepo::find_for_user(&self.pool, user_id)
            .await
            .map_err(unavailable)
    }

    async fn replace(&self, set: &RecommendationSet) -> Result<(), PortError> {
        RecommendationRepo::replace(&self.pool, set)
            .await
            .map_err(unavailable)
    }
}
