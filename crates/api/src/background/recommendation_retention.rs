//! Periodic purge of expired recommendation sets.
//!
//! Reads already treat sets older than the TTL as absent; this job only
//! reclaims their rows. Runs on a fixed interval using
//! `tokio::time::interval`.

use std::time::Duration;

use chefmatch_db::repositories::RecommendationRepo;
use chefmatch_db::DbPool;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the retention loop until `cancel` is triggered.
///
/// Each tick deletes sets whose `generated_at` is older than `ttl`.
pub async fn run(pool: DbPool, ttl: chrono::Duration, cancel: CancellationToken) {
    tracing::info!(
        ttl_days = ttl.num_days(),
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Recommendation retention job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Recommendation retention job stopping");
                break;
            }
            _ = interval.tick() => {
                purge_expired(&pool, ttl).await;
            }
        }
    }
}

/// One cleanup pass. Returns the number of sets removed.
pub async fn purge_expired(pool: &DbPool, ttl: chrono::Duration) -> u64 {
    let cutoff = Utc::now() - ttl;
    match RecommendationRepo::delete_older_than(pool, cutoff).await {
        Ok(deleted) => {
            if deleted > 0 {
                tracing::info!(deleted, "Recommendation retention: purged expired sets");
            } else {
                tracing::debug!("Recommendation retention: nothing to purge");
            }
            deleted
        }
        Err(e) => {
            tracing::error!(error = %e, "Recommendation retention: cleanup failed");
            0
        }
    }
}
