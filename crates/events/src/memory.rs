//! In-process [`MessageQueue`].
//!
//! Same delivery contract as [`PgQueue`](crate::PgQueue) (one consumer per
//! message, explicit settlement, delayed redelivery on nack) but nothing
//! survives a restart. Used for tests and single-process runs.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use chefmatch_core::types::DbId;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::queue::{BusError, Delivery, MessageQueue};

#[derive(Debug, Clone)]
struct StoredMessage {
    id: DbId,
    topic: String,
    payload: Vec<u8>,
    delivery_count: u32,
    visible_at: Instant,
}

#[derive(Default)]
struct State {
    next_id: DbId,
    ready: HashMap<String, VecDeque<StoredMessage>>,
    in_flight: HashMap<DbId, StoredMessage>,
    dead_letters: Vec<(Delivery, String)>,
}

/// Queue held entirely in memory.
#[derive(Default)]
pub struct MemoryQueue {
    state: Mutex<State>,
    notify: Notify,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages on `topic` waiting to be received (including delayed ones).
    pub async fn pending_count(&self, topic: &str) -> usize {
        let state = self.state.lock().await;
        state.ready.get(topic).map_or(0, VecDeque::len)
    }

    /// Messages received but not yet settled.
    pub async fn in_flight_count(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }

    /// Dead-lettered deliveries with their reasons.
    pub async fn dead_letters(&self) -> Vec<(Delivery, String)> {
        self.state.lock().await.dead_letters.clone()
    }

    async fn take_in_flight(&self, id: DbId) -> Result<StoredMessage, BusError> {
        self.state
            .lock()
            .await
            .in_flight
            .remove(&id)
            .ok_or(BusError::UnknownDelivery(id))
    }
}

#[async_trait]
impl MessageQueue for MemoryQueue {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BusError> {
        {
            let mut state = self.state.lock().await;
            state.next_id += 1;
            let msg = StoredMessage {
                id: state.next_id,
                topic: topic.to_string(),
                payload: payload.to_vec(),
                delivery_count: 0,
                visible_at: Instant::now(),
            };
            state.ready.entry(topic.to_string()).or_default().push_back(msg);
        }
        self.notify.notify_waiters();
        Ok(())
    }

    async fn receive(&self, topic: &str) -> Result<Delivery, BusError> {
        loop {
            // Register interest before inspecting state so a publish between
            // the check and the wait is not missed.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let next_wake = {
                let mut guard = self.state.lock().await;
                let state = &mut *guard;
                let now = Instant::now();
                let queue = state.ready.entry(topic.to_string()).or_default();

                match queue.iter().position(|m| m.visible_at <= now) {
                    Some(idx) => {
                        if let Some(mut msg) = queue.remove(idx) {
                            msg.delivery_count += 1;
                            let delivery = Delivery {
                                id: msg.id,
                                topic: msg.topic.clone(),
                                payload: msg.payload.clone(),
                                delivery_count: msg.delivery_count,
                            };
                            state.in_flight.insert(msg.id, msg);
                            return Ok(delivery);
                        }
                        None
                    }
                    None => queue.iter().map(|m| m.visible_at).min(),
                }
            };

            match next_wake {
                Some(at) => {
                    tokio::select! {
                        _ = &mut notified => {}
                        _ = tokio::time::sleep_until(at) => {}
                    }
                }
                None => notified.await,
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), BusError> {
        self.take_in_flight(delivery.id).await?;
        Ok(())
    }

    async fn nack(
        &self,
        delivery: &Delivery,
        redeliver_after: Duration,
        _reason: &str,
    ) -> Result<(), BusError> {
        let mut msg = self.take_in_flight(delivery.id).await?;
        msg.visible_at = Instant::now() + redeliver_after;
        {
            let mut state = self.state.lock().await;
            let queue = state.ready.entry(msg.topic.clone()).or_default();
            // Keep id order so redelivered messages precede newer ones.
            let idx = queue.iter().position(|m| m.id > msg.id).unwrap_or(queue.len());
            queue.insert(idx, msg);
        }
        self.notify.notify_waiters();
        Ok(())
    }

    async fn dead_letter(&self, delivery: &Delivery, reason: &str) -> Result<(), BusError> {
        self.take_in_flight(delivery.id).await?;
        self.state
            .lock()
            .await
            .dead_letters
            .push((delivery.clone(), reason.to_string()));
        Ok(())
    }
}
