use std::sync::Arc;

use chefmatch_core::ports::PreferenceStore;
use chefmatch_events::PreferencePublisher;
use chefmatch_pipeline::RecommendationQuery;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: chefmatch_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Read side of the recommendation pipeline.
    pub query: Arc<RecommendationQuery>,
    /// Users' current favorite category.
    pub preferences: Arc<dyn PreferenceStore>,
    /// Producer for `PreferenceChanged` events.
    pub publisher: PreferencePublisher,
}
