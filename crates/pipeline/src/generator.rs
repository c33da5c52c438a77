//! Recommendation generation.
//!
//! [`RecommendationGenerator`] is the only writer of recommendation sets.
//! Given a user and a category it fetches the catalog, ranks matching
//! recipes with [`ranking::build_set`], and replaces the user's stored set.
//! The ranking is deterministic, so running it twice for the same input
//! (e.g. on a duplicate event) just writes the same set again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chefmatch_core::ports::{Catalog, PortError, RecommendationStore};
use chefmatch_core::ranking;
use chefmatch_core::recommendation::RecommendationSet;
use chrono::Utc;

use crate::config::PipelineConfig;
use crate::error::GenerationError;

/// Builds and persists ranked recommendation sets.
pub struct RecommendationGenerator {
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn RecommendationStore>,
    max_items: usize,
    call_timeout: Duration,
}

impl RecommendationGenerator {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn RecommendationStore>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            max_items: config.max_items,
            call_timeout: config.collaborator_timeout,
        }
    }

    /// Generate with the default per-call timeout of the asynchronous path.
    pub async fn generate(
        &self,
        user_id: &str,
        category: &str,
    ) -> Result<RecommendationSet, GenerationError> {
        self.generate_within(user_id, category, self.call_timeout)
            .await
    }

    /// Generate, bounding each collaborator call by `call_timeout`.
    ///
    /// A timed-out catalog fetch is reported as
    /// [`GenerationError::CatalogUnavailable`], a timed-out write as
    /// [`GenerationError::StoreWrite`].
    pub async fn generate_within(
        &self,
        user_id: &str,
        category: &str,
        call_timeout: Duration,
    ) -> Result<RecommendationSet, GenerationError> {
        let user_id = user_id.trim();
        let category = category.trim();
        if user_id.is_empty() {
            return Err(GenerationError::InvalidInput("user id must not be empty".into()));
        }
        if category.is_empty() {
            return Err(GenerationError::InvalidInput("category must not be empty".into()));
        }

        let entries = bounded(call_timeout, self.catalog.list_by_category(category))
            .await
            .map_err(GenerationError::CatalogUnavailable)?;

        let set = ranking::build_set(user_id, category, &entries, self.max_items, Utc::now())
            .ok_or_else(|| GenerationError::NoMatch {
                category: category.to_string(),
            })?;

        bounded(call_timeout, self.store.replace(&set))
            .await
            .map_err(GenerationError::StoreWrite)?;

        tracing::info!(
            user_id,
            category,
            items = set.items.len(),
            "Recommendations generated",
        );

        Ok(set)
    }
}

/// Run a collaborator call under a timeout, folding the timeout into
/// [`PortError::TimedOut`].
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, PortError>>,
) -> Result<T, PortError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PortError::TimedOut(limit)),
    }
}
