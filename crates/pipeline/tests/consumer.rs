//! Tests for `EventConsumer` settlement decisions, driven through a
//! `MemoryQueue`.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use assert_matches::assert_matches;
use chefmatch_core::events::PreferenceChanged;
use chefmatch_events::MessageQueue;
use chefmatch_pipeline::{Disposition, PipelineConfig};
use common::{sample_catalog, Harness, TOPIC};
use tokio_util::sync::CancellationToken;

async fn publish(h: &Harness, user_id: &str, category: &str) -> PreferenceChanged {
    let event = PreferenceChanged::new(user_id, category);
    h.queue
        .publish(TOPIC, &event.to_bytes().unwrap())
        .await
        .unwrap();
    event
}

// ---------------------------------------------------------------------------
// Test: a valid event regenerates and is acked
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_event_is_generated_and_acked() {
    let h = Harness::new(sample_catalog());
    publish(&h, "u-1", "Vegan").await;

    let disposition = h.consumer.process_one().await.unwrap();

    assert_eq!(disposition, Disposition::Ack);
    let stored = h.store.snapshot("u-1").await.unwrap();
    assert_eq!(stored.names(), vec!["Buddha Bowl", "Chana Masala"]);
    assert_eq!(h.queue.in_flight_count().await, 0);
    assert_eq!(h.queue.pending_count(TOPIC).await, 0);
}

// ---------------------------------------------------------------------------
// Test: the same event twice leaves exactly one set
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_event_is_harmless() {
    let h = Harness::new(sample_catalog());
    let event = publish(&h, "u-1", "Mexican").await;
    h.queue
        .publish(TOPIC, &event.to_bytes().unwrap())
        .await
        .unwrap();

    assert_eq!(h.consumer.process_one().await.unwrap(), Disposition::Ack);
    let first = h.store.snapshot("u-1").await.unwrap();
    assert_eq!(h.consumer.process_one().await.unwrap(), Disposition::Ack);
    let second = h.store.snapshot("u-1").await.unwrap();

    assert_eq!(h.store.len().await, 1);
    assert_eq!(first.items, second.items);
    assert_eq!(second.items.len(), 2);
}

// ---------------------------------------------------------------------------
// Test: malformed payloads are acked and dropped
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_payload_is_acked() {
    let h = Harness::new(sample_catalog());
    h.queue.publish(TOPIC, b"not json").await.unwrap();
    h.queue
        .publish(TOPIC, br#"{"userId":"u-1","category":"","timestamp":"2024-06-01T00:00:00Z"}"#)
        .await
        .unwrap();

    assert_eq!(h.consumer.process_one().await.unwrap(), Disposition::Ack);
    assert_eq!(h.consumer.process_one().await.unwrap(), Disposition::Ack);

    assert_eq!(h.catalog.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.queue.pending_count(TOPIC).await, 0);
    assert!(h.queue.dead_letters().await.is_empty());
}

// ---------------------------------------------------------------------------
// Test: no matching recipes is terminal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn no_match_is_acked() {
    let h = Harness::new(sample_catalog());
    publish(&h, "u-1", "Nonexistent").await;

    assert_eq!(h.consumer.process_one().await.unwrap(), Disposition::Ack);
    assert!(h.store.snapshot("u-1").await.is_none());
    assert_eq!(h.queue.pending_count(TOPIC).await, 0);
}

// ---------------------------------------------------------------------------
// Test: retryable failures are nacked, then succeed on redelivery
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn catalog_outage_is_retried_until_it_recovers() {
    let h = Harness::new(sample_catalog());
    h.catalog.set_failing(true);
    publish(&h, "u-1", "Italian").await;

    let first = h.consumer.process_one().await.unwrap();
    assert_matches!(first, Disposition::Retry { after, .. } if after == Duration::from_secs(1));
    assert_eq!(h.queue.pending_count(TOPIC).await, 1);

    let second = h.consumer.process_one().await.unwrap();
    assert_matches!(second, Disposition::Retry { after, .. } if after == Duration::from_secs(2));

    h.catalog.set_failing(false);
    assert_eq!(h.consumer.process_one().await.unwrap(), Disposition::Ack);
    assert_eq!(h.store.snapshot("u-1").await.unwrap().category, "Italian");
    assert_eq!(h.queue.pending_count(TOPIC).await, 0);
}

// ---------------------------------------------------------------------------
// Test: retries are bounded by max_deliveries
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn persistent_store_failure_is_dead_lettered() {
    let config = PipelineConfig {
        max_deliveries: 3,
        ..Default::default()
    };
    let h = Harness::with_config(sample_catalog(), config);
    h.store.set_failing_writes(true);
    publish(&h, "u-1", "Italian").await;

    assert_matches!(h.consumer.process_one().await, Ok(Disposition::Retry { .. }));
    assert_matches!(h.consumer.process_one().await, Ok(Disposition::Retry { .. }));
    assert_matches!(h.consumer.process_one().await, Ok(Disposition::DeadLetter { .. }));

    let dead = h.queue.dead_letters().await;
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].0.delivery_count, 3);
    assert!(dead[0].1.contains("store"));
    assert_eq!(h.queue.pending_count(TOPIC).await, 0);
}

// ---------------------------------------------------------------------------
// Test: the run loop drains the queue and stops on cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_loop_consumes_until_cancelled() {
    let h = Harness::new(sample_catalog());
    publish(&h, "u-1", "Italian").await;
    publish(&h, "u-2", "Vegan").await;

    let cancel = CancellationToken::new();
    let consumer = h.consumer.clone();
    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { consumer.run(cancel).await })
    };

    for _ in 0..100 {
        if h.store.len().await == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(h.store.len().await, 2);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("consumer did not stop")
        .unwrap();
}
