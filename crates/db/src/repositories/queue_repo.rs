//! Repository for the `queue_messages` table (durable named queues).
//!
//! Delivery is lease based. [`QueueRepo::claim_next`] hides the claimed
//! message for a visibility timeout; acknowledging deletes it, a negative
//! acknowledgement makes it visible again after a delay, and an expired lease
//! makes it visible again on its own. Messages are therefore delivered at
//! least once.

use chefmatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::queue::QueueMessage;

/// Column list for `queue_messages` RETURNING clauses.
const COLUMNS: &str = "id, topic, payload, delivery_count, enqueued_at";

/// Provides publish/claim/settle operations for queued messages.
pub struct QueueRepo;

impl QueueRepo {
    /// Append a message to `topic`. It is immediately claimable.
    pub async fn enqueue(pool: &PgPool, topic: &str, payload: &[u8]) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO queue_messages (topic, payload) VALUES ($1, $2) RETURNING id",
        )
        .bind(topic)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// Atomically claim the oldest visible message on `topic`.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so competing consumers never
    /// claim the same message. The claim bumps `delivery_count` and hides
    /// the message for `visibility_ms`.
    pub async fn claim_next(
        pool: &PgPool,
        topic: &str,
        visibility_ms: i64,
    ) -> Result<Option<QueueMessage>, sqlx::Error> {
        let query = format!(
            "UPDATE queue_messages \
             SET delivery_count = delivery_count + 1, \
                 visible_at = NOW() + ($2::BIGINT * INTERVAL '1 millisecond') \
             WHERE id = ( \
                 SELECT id FROM queue_messages \
                 WHERE topic = $1 \
                   AND dead_lettered_at IS NULL \
                   AND visible_at <= NOW() \
                 ORDER BY id ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QueueMessage>(&query)
            .bind(topic)
            .bind(visibility_ms)
            .fetch_optional(pool)
            .await
    }

    /// Remove a processed message.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM queue_messages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Make a claimed message visible again after `delay_ms`.
    pub async fn release(
        pool: &PgPool,
        id: DbId,
        delay_ms: i64,
        error: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queue_messages \
             SET visible_at = NOW() + ($2::BIGINT * INTERVAL '1 millisecond'), \
                 last_error = COALESCE($3, last_error) \
             WHERE id = $1 AND dead_lettered_at IS NULL",
        )
        .bind(id)
        .bind(delay_ms)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Park a message permanently so it is never redelivered.
    pub async fn dead_letter(pool: &PgPool, id: DbId, reason: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queue_messages \
             SET dead_lettered_at = NOW(), last_error = $2 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of live (not dead-lettered) messages on `topic`.
    pub async fn count_pending(pool: &PgPool, topic: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM queue_messages \
             WHERE topic = $1 AND dead_lettered_at IS NULL",
        )
        .bind(topic)
        .fetch_one(pool)
        .await
    }
}
