//! Recommendation reads.
//!
//! Two operations back the read endpoint:
//!
//! - [`RecommendationQuery::preview_category`]: one random recipe from a
//!   caller-chosen category, straight from the catalog. Never touches the
//!   stored set.
//! - [`RecommendationQuery::get_cached`]: the user's stored set, or, when it
//!   is absent or expired, a synchronous regeneration from their current
//!   preference.
//!
//! Neither returns an error. Missing data and collaborator failures both
//! turn into a one-line placeholder so the caller can always answer 200.

use std::sync::Arc;
use std::time::Duration;

use chefmatch_core::category;
use chefmatch_core::ports::{Catalog, PortError, PreferenceStore, RecommendationStore};
use chefmatch_core::recommendation::{
    CatalogEntry, CHOOSE_CATEGORY_PLACEHOLDER, DEGRADED_PLACEHOLDER, NO_RECIPES_PLACEHOLDER,
};
use chrono::Utc;
use rand::seq::IndexedRandom;

use crate::config::PipelineConfig;
use crate::error::GenerationError;
use crate::generator::RecommendationGenerator;

/// Where a read result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    /// A fresh stored set.
    Cached,
    /// Regenerated during the read because the stored set was missing or
    /// expired.
    Generated,
    /// One random pick from a caller-chosen category.
    Preview,
    /// A fixed sentence standing in for real recommendations.
    Placeholder,
}

/// Result of a recommendation read: recipe names in rank order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendations {
    pub names: Vec<String>,
    pub source: RecommendationSource,
}

impl Recommendations {
    fn placeholder(text: &str) -> Self {
        Self {
            names: vec![text.to_string()],
            source: RecommendationSource::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.source == RecommendationSource::Placeholder
    }
}

/// Read side of the pipeline.
pub struct RecommendationQuery {
    generator: Arc<RecommendationGenerator>,
    catalog: Arc<dyn Catalog>,
    preferences: Arc<dyn PreferenceStore>,
    store: Arc<dyn RecommendationStore>,
    ttl: chrono::Duration,
    fallback_timeout: Duration,
}

impl RecommendationQuery {
    pub fn new(
        generator: Arc<RecommendationGenerator>,
        catalog: Arc<dyn Catalog>,
        preferences: Arc<dyn PreferenceStore>,
        store: Arc<dyn RecommendationStore>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            generator,
            catalog,
            preferences,
            store,
            ttl: config.ttl,
            fallback_timeout: config.fallback_timeout,
        }
    }

    /// Entry point of the read endpoint.
    ///
    /// A non-blank `category_override` previews that category; otherwise the
    /// user's cached set is served.
    pub async fn get_recommendations(
        &self,
        user_id: &str,
        category_override: Option<&str>,
    ) -> Recommendations {
        match category_override.map(str::trim).filter(|c| !c.is_empty()) {
            Some(category) => self.preview_category(category).await,
            None => self.get_cached(user_id).await,
        }
    }

    /// One pseudo-random recipe from `category`.
    pub async fn preview_category(&self, category: &str) -> Recommendations {
        let fetched = tokio::time::timeout(
            self.fallback_timeout,
            self.catalog.list_by_category(category),
        )
        .await;

        let entries = match fetched {
            Ok(Ok(entries)) => entries,
            Ok(Err(e)) => {
                tracing::warn!(category, error = %e, "Category preview failed");
                return Recommendations::placeholder(DEGRADED_PLACEHOLDER);
            }
            Err(_) => {
                tracing::warn!(category, "Category preview timed out");
                return Recommendations::placeholder(DEGRADED_PLACEHOLDER);
            }
        };

        let target = category::normalize(category);
        let matching: Vec<&CatalogEntry> = entries
            .iter()
            .filter(|e| category::matches_normalized(&e.category, &target))
            .collect();

        match matching.choose(&mut rand::rng()) {
            Some(entry) => Recommendations {
                names: vec![entry.name.clone()],
                source: RecommendationSource::Preview,
            },
            None => Recommendations::placeholder(NO_RECIPES_PLACEHOLDER),
        }
    }

    /// The user's stored set, regenerating inline on a miss.
    pub async fn get_cached(&self, user_id: &str) -> Recommendations {
        let stored = tokio::time::timeout(self.fallback_timeout, self.store.get(user_id)).await;

        match stored {
            Ok(Ok(Some(set))) if !set.is_expired(Utc::now(), self.ttl) => {
                return Recommendations {
                    names: set.names(),
                    source: RecommendationSource::Cached,
                };
            }
            Ok(Ok(Some(_))) => {
                tracing::debug!(user_id, "Stored recommendations expired");
            }
            Ok(Ok(None)) => {
                tracing::debug!(user_id, "No stored recommendations");
            }
            Ok(Err(e)) => {
                tracing::warn!(user_id, error = %e, "Recommendation store read failed");
            }
            Err(_) => {
                tracing::warn!(user_id, "Recommendation store read timed out");
            }
        }

        match tokio::time::timeout(self.fallback_timeout, self.regenerate(user_id)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    user_id,
                    timeout_ms = self.fallback_timeout.as_millis() as u64,
                    "Synchronous regeneration timed out",
                );
                Recommendations::placeholder(DEGRADED_PLACEHOLDER)
            }
        }
    }

    async fn regenerate(&self, user_id: &str) -> Recommendations {
        let preference = match self.current_preference(user_id).await {
            Ok(Some(category)) => category,
            Ok(None) => return Recommendations::placeholder(CHOOSE_CATEGORY_PLACEHOLDER),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Preference lookup failed");
                return Recommendations::placeholder(DEGRADED_PLACEHOLDER);
            }
        };

        match self
            .generator
            .generate_within(user_id, &preference, self.fallback_timeout)
            .await
        {
            Ok(set) => Recommendations {
                names: set.names(),
                source: RecommendationSource::Generated,
            },
            Err(GenerationError::NoMatch { .. } | GenerationError::InvalidInput(_)) => {
                Recommendations::placeholder(CHOOSE_CATEGORY_PLACEHOLDER)
            }
            Err(e) => {
                tracing::warn!(user_id, category = %preference, error = %e, "Synchronous regeneration failed");
                Recommendations::placeholder(DEGRADED_PLACEHOLDER)
            }
        }
    }

    async fn current_preference(&self, user_id: &str) -> Result<Option<String>, PortError> {
        let preference = self.preferences.current_preference(user_id).await?;
        Ok(preference.filter(|c| !c.trim().is_empty()))
    }
}
