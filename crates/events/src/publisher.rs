//! Producer side of the preference topic.

use std::sync::Arc;

use chefmatch_core::events::PreferenceChanged;

use crate::queue::{BusError, MessageQueue};

/// Publishes [`PreferenceChanged`] events to one named queue.
#[derive(Clone)]
pub struct PreferencePublisher {
    queue: Arc<dyn MessageQueue>,
    topic: String,
}

impl PreferencePublisher {
    pub fn new(queue: Arc<dyn MessageQueue>, topic: impl Into<String>) -> Self {
        Self {
            queue,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Encode and enqueue `event`.
    pub async fn publish(&self, event: &PreferenceChanged) -> Result<(), BusError> {
        let payload = event.to_bytes()?;
        self.queue.publish(&self.topic, &payload).await?;

        tracing::info!(
            user_id = %event.user_id,
            category = %event.category,
            topic = %self.topic,
            "Preference change published",
        );
        Ok(())
    }
}
