//! Standalone preference-event worker.
//!
//! Runs a pool of competing [`EventConsumer`]s against the durable
//! PostgreSQL queue. Any number of worker processes (and API instances
//! with their in-process consumer) may share one queue; each message is
//! handled by one of them at a time.

use std::sync::Arc;
use std::time::Duration;

use chefmatch_core::events::DEFAULT_PREFERENCE_QUEUE;
use chefmatch_db::{DbPool, PgCatalog, PgRecommendationStore};
use chefmatch_events::{MessageQueue, PgQueue, PgQueueConfig};
use chefmatch_pipeline::{EventConsumer, PipelineConfig, RecommendationGenerator};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default number of consumer tasks per worker process.
const DEFAULT_CONCURRENCY: usize = 2;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Queue the consumers drain.
    pub topic: String,
    /// Number of consumer tasks.
    pub concurrency: usize,
    pub queue: PgQueueConfig,
    pub pipeline: PipelineConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_PREFERENCE_QUEUE.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            queue: PgQueueConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl WorkerConfig {
    /// | Env Var                | Default        |
    /// |------------------------|----------------|
    /// | `PREFERENCE_QUEUE`     | `user_updates` |
    /// | `CONSUMER_CONCURRENCY` | `2`            |
    ///
    /// Queue polling and pipeline tuning come from
    /// [`PgQueueConfig::from_env`] and [`PipelineConfig::from_env`].
    pub fn from_env() -> Self {
        Self::from_env_with(DEFAULT_CONCURRENCY)
    }

    /// Like [`from_env`](Self::from_env) with a different default for
    /// `CONSUMER_CONCURRENCY`.
    pub fn from_env_with(default_concurrency: usize) -> Self {
        let topic = std::env::var("PREFERENCE_QUEUE")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFERENCE_QUEUE.to_string());

        let concurrency = std::env::var("CONSUMER_CONCURRENCY")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(default_concurrency)
            .max(1);

        Self {
            topic,
            concurrency,
            queue: PgQueueConfig::from_env(),
            pipeline: PipelineConfig::from_env(),
        }
    }
}

/// Wire a consumer against the PostgreSQL-backed queue and stores.
pub fn build_consumer(pool: DbPool, config: &WorkerConfig) -> EventConsumer {
    let generator = Arc::new(RecommendationGenerator::new(
        Arc::new(PgCatalog::new(pool.clone())),
        Arc::new(PgRecommendationStore::new(pool.clone())),
        &config.pipeline,
    ));
    let queue: Arc<dyn MessageQueue> = Arc::new(PgQueue::new(pool, config.queue.clone()));

    EventConsumer::new(queue, generator, config.topic.clone(), &config.pipeline)
}

/// Spawn `config.concurrency` consumer tasks that run until `cancel` fires.
pub fn spawn_consumers(
    pool: DbPool,
    config: &WorkerConfig,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    let consumer = build_consumer(pool, config);

    tracing::info!(
        topic = %config.topic,
        concurrency = config.concurrency,
        "Spawning event consumers",
    );

    (0..config.concurrency)
        .map(|_| {
            let consumer = consumer.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { consumer.run(cancel).await })
        })
        .collect()
}

/// Wait up to `timeout` for each consumer task to finish.
///
/// Returns how many were abandoned because they missed the deadline. Their
/// in-flight message is redelivered once its lease expires.
pub async fn drain_consumers(handles: Vec<JoinHandle<()>>, timeout: Duration) -> usize {
    let mut abandoned = 0;
    for handle in handles {
        if tokio::time::timeout(timeout, handle).await.is_err() {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Event consumer did not stop in time, abandoning it",
            );
            abandoned += 1;
        }
    }
    abandoned
}
