//! PostgreSQL-backed [`MessageQueue`].
//!
//! Messages live in `queue_messages`. Receivers poll with
//! [`QueueRepo::claim_next`], which leases one message at a time, so any
//! number of consumer processes can share a topic.

use std::time::Duration;

use async_trait::async_trait;
use chefmatch_db::repositories::QueueRepo;
use chefmatch_db::DbPool;

use crate::queue::{BusError, Delivery, MessageQueue};

/// Default interval between claim attempts on an empty queue.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default lease on a claimed message before it is redelivered.
const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

/// Polling and lease settings for [`PgQueue`].
#[derive(Debug, Clone)]
pub struct PgQueueConfig {
    pub poll_interval: Duration,
    /// Must exceed the longest expected handling time, otherwise a slow
    /// consumer's message is handed to another consumer.
    pub visibility_timeout: Duration,
}

impl Default for PgQueueConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            visibility_timeout: DEFAULT_VISIBILITY_TIMEOUT,
        }
    }
}

impl PgQueueConfig {
    /// Load from the environment.
    ///
    /// | Env Var                         | Default |
    /// |---------------------------------|---------|
    /// | `QUEUE_POLL_INTERVAL_MS`        | `500`   |
    /// | `QUEUE_VISIBILITY_TIMEOUT_SECS` | `30`    |
    pub fn from_env() -> Self {
        let poll_interval = std::env::var("QUEUE_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let visibility_timeout = std::env::var("QUEUE_VISIBILITY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_VISIBILITY_TIMEOUT);

        Self {
            poll_interval,
            visibility_timeout,
        }
    }
}

/// Durable queue over the `queue_messages` table.
#[derive(Clone)]
pub struct PgQueue {
    pool: DbPool,
    config: PgQueueConfig,
}

impl PgQueue {
    pub fn new(pool: DbPool, config: PgQueueConfig) -> Self {
        Self { pool, config }
    }
}

fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

#[async_trait]
impl MessageQueue for PgQueue {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BusError> {
        let id = QueueRepo::enqueue(&self.pool, topic, payload).await?;
        tracing::debug!(message_id = id, topic, "Message enqueued");
        Ok(())
    }

    async fn receive(&self, topic: &str) -> Result<Delivery, BusError> {
        let visibility_ms = millis(self.config.visibility_timeout);
        loop {
            if let Some(msg) = QueueRepo::claim_next(&self.pool, topic, visibility_ms).await? {
                return Ok(Delivery {
                    id: msg.id,
                    topic: msg.topic,
                    payload: msg.payload,
                    delivery_count: u32::try_from(msg.delivery_count).unwrap_or(u32::MAX),
                });
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), BusError> {
        if !QueueRepo::delete(&self.pool, delivery.id).await? {
            // Lease expired and another consumer already settled it.
            tracing::warn!(message_id = delivery.id, "Ack for message no longer queued");
        }
        Ok(())
    }

    async fn nack(
        &self,
        delivery: &Delivery,
        redeliver_after: Duration,
        reason: &str,
    ) -> Result<(), BusError> {
        QueueRepo::release(&self.pool, delivery.id, millis(redeliver_after), Some(reason)).await?;
        Ok(())
    }

    async fn dead_letter(&self, delivery: &Delivery, reason: &str) -> Result<(), BusError> {
        if !QueueRepo::dead_letter(&self.pool, delivery.id, reason).await? {
            return Err(BusError::UnknownDelivery(delivery.id));
        }
        Ok(())
    }
}
