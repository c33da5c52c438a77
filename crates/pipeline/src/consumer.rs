//! Event consumer.
//!
//! Drains the preference queue into the [`RecommendationGenerator`]. Each
//! delivery is settled explicitly:
//!
//! - generated, no matching recipes, or malformed payload: ack
//! - catalog/store failure below `max_deliveries`: nack with backoff
//! - catalog/store failure at `max_deliveries`: dead-letter
//!
//! Several consumers may share one topic; the queue hands each message to
//! exactly one of them at a time.

use std::sync::Arc;
use std::time::Duration;

use chefmatch_core::events::PreferenceChanged;
use chefmatch_events::backoff::{delay_for_attempt, next_delay};
use chefmatch_events::{BackoffConfig, BusError, Delivery, MessageQueue};
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;
use crate::error::GenerationError;
use crate::generator::RecommendationGenerator;

/// How a delivery should be settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    Retry { after: Duration, reason: String },
    DeadLetter { reason: String },
}

/// Long-lived consumer of one preference topic.
#[derive(Clone)]
pub struct EventConsumer {
    queue: Arc<dyn MessageQueue>,
    generator: Arc<RecommendationGenerator>,
    topic: String,
    max_deliveries: u32,
    backoff: BackoffConfig,
}

impl EventConsumer {
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        generator: Arc<RecommendationGenerator>,
        topic: impl Into<String>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            queue,
            generator,
            topic: topic.into(),
            max_deliveries: config.max_deliveries,
            backoff: config.redelivery_backoff.clone(),
        }
    }

    /// Consume until `cancel` fires.
    ///
    /// Queue errors are logged and retried with backoff; they never end the
    /// loop. A message being handled when `cancel` fires is finished and
    /// settled first.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(topic = %self.topic, "Event consumer started");
        let mut error_delay = self.backoff.initial_delay;

        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(topic = %self.topic, "Event consumer shutting down");
                    break;
                }
                received = self.queue.receive(&self.topic) => received,
            };

            let outcome = match received {
                Ok(delivery) => self.process(&delivery).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => error_delay = self.backoff.initial_delay,
                Err(e) => {
                    tracing::error!(
                        topic = %self.topic,
                        error = %e,
                        retry_in_ms = error_delay.as_millis() as u64,
                        "Event queue error",
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(error_delay) => {}
                    }
                    error_delay = next_delay(error_delay, &self.backoff);
                }
            }
        }
    }

    /// Receive, handle and settle a single message.
    pub async fn process_one(&self) -> Result<Disposition, BusError> {
        let delivery = self.queue.receive(&self.topic).await?;
        let disposition = self.handle(&delivery).await;
        self.settle(&delivery, &disposition).await?;
        Ok(disposition)
    }

    async fn process(&self, delivery: &Delivery) -> Result<(), BusError> {
        let disposition = self.handle(delivery).await;
        self.settle(delivery, &disposition).await
    }

    /// Decide the fate of one delivery, running generation if the payload
    /// parses.
    pub async fn handle(&self, delivery: &Delivery) -> Disposition {
        let event = match PreferenceChanged::from_bytes(&delivery.payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    message_id = delivery.id,
                    error = %e,
                    "Discarding malformed preference event",
                );
                return Disposition::Ack;
            }
        };

        match self
            .generator
            .generate(&event.user_id, &event.category)
            .await
        {
            Ok(_) => Disposition::Ack,
            Err(GenerationError::NoMatch { category }) => {
                tracing::info!(
                    user_id = %event.user_id,
                    category = %category,
                    "No recipes for category, nothing to generate",
                );
                Disposition::Ack
            }
            Err(e) if e.is_retryable() => {
                self.retry_or_give_up(delivery, &event, e.to_string())
            }
            Err(e) => {
                tracing::warn!(
                    message_id = delivery.id,
                    user_id = %event.user_id,
                    error = %e,
                    "Discarding unprocessable preference event",
                );
                Disposition::Ack
            }
        }
    }

    fn retry_or_give_up(
        &self,
        delivery: &Delivery,
        event: &PreferenceChanged,
        reason: String,
    ) -> Disposition {
        if delivery.delivery_count >= self.max_deliveries {
            tracing::error!(
                message_id = delivery.id,
                user_id = %event.user_id,
                delivery_count = delivery.delivery_count,
                error = %reason,
                "Giving up on preference event",
            );
            return Disposition::DeadLetter { reason };
        }

        let after = delay_for_attempt(delivery.delivery_count, &self.backoff);
        tracing::warn!(
            message_id = delivery.id,
            user_id = %event.user_id,
            delivery_count = delivery.delivery_count,
            retry_in_ms = after.as_millis() as u64,
            error = %reason,
            "Generation failed, message will be redelivered",
        );
        Disposition::Retry { after, reason }
    }

    /// Apply `disposition` to `delivery` on the queue.
    pub async fn settle(
        &self,
        delivery: &Delivery,
        disposition: &Disposition,
    ) -> Result<(), BusError> {
        match disposition {
            Disposition::Ack => self.queue.ack(delivery).await,
            Disposition::Retry { after, reason } => {
                self.queue.nack(delivery, *after, reason).await
            }
            Disposition::DeadLetter { reason } => self.queue.dead_letter(delivery, reason).await,
        }
    }
}
