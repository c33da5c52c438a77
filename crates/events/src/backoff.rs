//! Exponential backoff.
//!
//! Used for two things: spacing out redeliveries of messages that failed
//! with a retryable error, and retrying the database (queue backend)
//! connection at startup until it becomes reachable.

use std::time::Duration;

use chefmatch_db::DbPool;
use tokio_util::sync::CancellationToken;

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`BackoffConfig::max_delay`].
pub fn next_delay(current: Duration, config: &BackoffConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Delay before retry number `attempt` (1-based).
pub fn delay_for_attempt(attempt: u32, config: &BackoffConfig) -> Duration {
    let mut delay = config.initial_delay.min(config.max_delay);
    for _ in 1..attempt {
        if delay >= config.max_delay {
            break;
        }
        delay = next_delay(delay, config);
    }
    delay
}

/// Connect to the database with exponential backoff.
///
/// Retries forever: in an orchestrated deployment the database may simply
/// start later than this service. Returns `None` only if `cancel` fires
/// first.
pub async fn connect_with_backoff(
    database_url: &str,
    config: &BackoffConfig,
    cancel: &CancellationToken,
) -> Option<DbPool> {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Database connect cancelled");
                return None;
            }
            result = chefmatch_db::create_pool(database_url) => {
                match result {
                    Ok(pool) => {
                        tracing::info!(attempt, "Connected to database");
                        return Some(pool);
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            attempt,
                            retry_in_ms = delay.as_millis() as u64,
                            "Database connect failed",
                        );
                    }
                }
            }
        }

        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        delay = next_delay(delay, config);
    }
}
