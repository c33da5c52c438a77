use std::time::Duration;

use chefmatch_core::ranking::MAX_ITEMS;
use chefmatch_core::recommendation::DEFAULT_TTL_DAYS;
use chefmatch_events::BackoffConfig;

/// Default bound on each collaborator call on the asynchronous path.
const DEFAULT_COLLABORATOR_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default bound on the whole synchronous fallback of a read.
const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_millis(1500);

/// Floor for the collaborator timeout, leaving room for a shorter fallback.
const MIN_COLLABORATOR_TIMEOUT: Duration = Duration::from_millis(10);

/// Default number of deliveries before a message is dead-lettered.
const DEFAULT_MAX_DELIVERIES: u32 = 5;

/// Tuning for generation, consumption and reads.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Age after which a stored set is treated as absent.
    pub ttl: chrono::Duration,
    /// Upper bound on items per set (never above [`MAX_ITEMS`]).
    pub max_items: usize,
    /// Timeout for each catalog/store call when handling events.
    pub collaborator_timeout: Duration,
    /// Timeout for the synchronous regenerate-on-miss path of a read.
    /// Always strictly shorter than `collaborator_timeout`.
    pub fallback_timeout: Duration,
    /// Deliveries after which a retryable failure is dead-lettered.
    pub max_deliveries: u32,
    /// Spacing of redeliveries after retryable failures.
    pub redelivery_backoff: BackoffConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ttl: chrono::Duration::days(DEFAULT_TTL_DAYS),
            max_items: MAX_ITEMS,
            collaborator_timeout: DEFAULT_COLLABORATOR_TIMEOUT,
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
            max_deliveries: DEFAULT_MAX_DELIVERIES,
            redelivery_backoff: BackoffConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from environment variables, falling back to defaults for
    /// anything missing or unparsable.
    ///
    /// | Env Var                    | Default |
    /// |----------------------------|---------|
    /// | `RECOMMENDATION_TTL_DAYS`  | `7`     |
    /// | `RECOMMENDATION_MAX_ITEMS` | `5`     |
    /// | `COLLABORATOR_TIMEOUT_MS`  | `5000`  |
    /// | `FALLBACK_TIMEOUT_MS`      | `1500`  |
    /// | `MAX_DELIVERIES`           | `5`     |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse_u64 = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let ttl = lookup("RECOMMENDATION_TTL_DAYS")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|d| *d > 0)
            .map(chrono::Duration::days)
            .unwrap_or(defaults.ttl);

        let max_items = parse_u64("RECOMMENDATION_MAX_ITEMS")
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(defaults.max_items);

        let collaborator_timeout = parse_u64("COLLABORATOR_TIMEOUT_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.collaborator_timeout);

        let fallback_timeout = parse_u64("FALLBACK_TIMEOUT_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.fallback_timeout);

        let max_deliveries = parse_u64("MAX_DELIVERIES")
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(defaults.max_deliveries);

        Self {
            ttl,
            max_items,
            collaborator_timeout,
            fallback_timeout,
            max_deliveries,
            redelivery_backoff: defaults.redelivery_backoff,
        }
        .normalized()
    }

    /// Clamp values into their valid ranges.
    pub fn normalized(mut self) -> Self {
        self.max_items = self.max_items.clamp(1, MAX_ITEMS);
        self.max_deliveries = self.max_deliveries.max(1);
        self.collaborator_timeout = self.collaborator_timeout.max(MIN_COLLABORATOR_TIMEOUT);
        if self.fallback_timeout >= self.collaborator_timeout {
            self.fallback_timeout = self.collaborator_timeout / 2;
        }
        self
    }
}
