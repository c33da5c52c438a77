//! Collaborator interfaces the recommendation pipeline depends on.
//!
//! Implementations live outside this crate (PostgreSQL in `chefmatch-db`,
//! in-memory fakes in tests). All methods are async I/O and may fail with a
//! [`PortError`]; callers decide whether that is retryable.

use std::time::Duration;

use async_trait::async_trait;

use crate::recommendation::{CatalogEntry, RecommendationSet};

/// Failure talking to a collaborator.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Collaborator timed out after {0:?}")]
    TimedOut(Duration),
}

/// Read-only access to the recipe catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Entries whose normalized category equals `category`, in catalog order.
    ///
    /// Implementations may over-return; callers re-filter client side.
    async fn list_by_category(&self, category: &str) -> Result<Vec<CatalogEntry>, PortError>;

    /// Every entry, in catalog order.
    async fn list_all(&self) -> Result<Vec<CatalogEntry>, PortError>;
}

/// Each user's current favorite category (single value, last write wins).
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn current_preference(&self, user_id: &str) -> Result<Option<String>, PortError>;

    async fn set_preference(&self, user_id: &str, category: &str) -> Result<(), PortError>;
}

/// Keyed, replace-on-write storage of one [`RecommendationSet`] per user.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// The stored set for `user_id`, expired or not.
    async fn get(&self, user_id: &str) -> Result<Option<RecommendationSet>, PortError>;

    /// Atomically replace whatever is stored for `set.user_id`.
    ///
    /// Concurrent readers observe either the previous complete set or the
    /// new complete set, never a mix.
    async fn replace(&self, set: &RecommendationSet) -> Result<(), PortError>;
}
