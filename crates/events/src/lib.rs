//! ChefMatch event bus.
//!
//! - [`MessageQueue`]: durable, at-least-once named queues with explicit
//!   acknowledgement.
//! - [`PgQueue`]: PostgreSQL implementation (competing consumers via
//!   `SKIP LOCKED`, lease-based redelivery).
//! - [`MemoryQueue`]: in-process implementation with the same contract.
//! - [`PreferencePublisher`]: producer side of the `PreferenceChanged` topic.
//! - [`backoff`]: exponential backoff shared by redelivery and startup
//!   connection retries.

pub mod backoff;
pub mod memory;
pub mod postgres;
pub mod publisher;
pub mod queue;

pub use backoff::BackoffConfig;
pub use memory::MemoryQueue;
pub use postgres::{PgQueue, PgQueueConfig};
pub use publisher::PreferencePublisher;
pub use queue::{BusError, Delivery, MessageQueue};
