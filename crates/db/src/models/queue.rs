//! Durable queue rows.

use chefmatch_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A message claimed from `queue_messages`.
///
/// `delivery_count` already includes the claim that returned this row.
#[derive(Debug, Clone, FromRow)]
pub struct QueueMessage {
    pub id: DbId,
    pub topic: String,
    pub payload: Vec<u8>,
    pub delivery_count: i32,
    pub enqueued_at: Timestamp,
}
