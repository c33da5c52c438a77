//! The message queue contract.

use std::time::Duration;

use async_trait::async_trait;
use chefmatch_core::types::DbId;

/// Queue backend failure.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Queue backend error: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Unknown delivery {0}")]
    UnknownDelivery(DbId),
}

/// A message handed to a consumer, pending acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub id: DbId,
    pub topic: String,
    pub payload: Vec<u8>,
    /// How many times this message has been handed out, this one included.
    pub delivery_count: u32,
}

impl Delivery {
    /// Whether this is a redelivery of a message seen before.
    pub fn is_redelivery(&self) -> bool {
        self.delivery_count > 1
    }
}

/// Durable named queues with at-least-once delivery.
///
/// Every message returned by [`receive`](MessageQueue::receive) must be
/// settled exactly once with [`ack`](MessageQueue::ack),
/// [`nack`](MessageQueue::nack) or
/// [`dead_letter`](MessageQueue::dead_letter). Each message goes to one
/// consumer at a time even when many consumers share a topic.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Append `payload` to `topic`.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BusError>;

    /// Suspend until a message is available on `topic`, then claim it.
    async fn receive(&self, topic: &str) -> Result<Delivery, BusError>;

    /// The message was handled; remove it for good.
    async fn ack(&self, delivery: &Delivery) -> Result<(), BusError>;

    /// The message could not be handled yet; hand it out again after
    /// `redeliver_after`.
    async fn nack(
        &self,
        delivery: &Delivery,
        redeliver_after: Duration,
        reason: &str,
    ) -> Result<(), BusError>;

    /// Give up on the message; it is kept for inspection but never
    /// redelivered.
    async fn dead_letter(&self, delivery: &Delivery, reason: &str) -> Result<(), BusError>;
}
