//! The preference-change to recommendation-regeneration pipeline.
//!
//! - [`RecommendationGenerator`]: builds a ranked, bounded set for a user
//!   and category and atomically replaces the stored one.
//! - [`EventConsumer`]: drains the preference queue into the generator with
//!   explicit ack / retry / dead-letter decisions.
//! - [`RecommendationQuery`]: serves reads, previewing a category or
//!   returning the cached set with synchronous regeneration on a miss.

pub mod config;
pub mod consumer;
pub mod error;
pub mod generator;
pub mod query;

pub use config::PipelineConfig;
pub use consumer::{Disposition, EventConsumer};
pub use error::GenerationError;
pub use generator::RecommendationGenerator;
pub use query::{RecommendationQuery, RecommendationSource, Recommendations};
