//! The `PreferenceChanged` event carried on the preference queue.
//!
//! Wire format (JSON):
//!
//! ```json
//! { "userId": "abc", "category": "Italian", "timestamp": "2024-05-01T12:00:00Z" }
//! ```
//!
//! Producers normalize the payload before publishing; consumers accept only
//! this one shape. Unknown extra fields are ignored.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Default name of the durable queue carrying preference changes.
pub const DEFAULT_PREFERENCE_QUEUE: &str = "user_updates";

/// Why a queue payload could not be turned into a [`PreferenceChanged`].
#[derive(Debug, thiserror::Error)]
pub enum EventParseError {
    #[error("Malformed event payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Event field `{0}` must not be empty")]
    EmptyField(&'static str),
}

/// A user changed their favorite food category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceChanged {
    pub user_id: String,
    pub category: String,
    #[serde(rename = "timestamp")]
    pub occurred_at: Timestamp,
}

impl PreferenceChanged {
    /// Build an event stamped with the current time.
    ///
    /// Both fields are trimmed here so consumers never see padding.
    pub fn new(user_id: impl AsRef<str>, category: impl AsRef<str>) -> Self {
        Self {
            user_id: user_id.as_ref().trim().to_string(),
            category: category.as_ref().trim().to_string(),
            occurred_at: Utc::now(),
        }
    }

    /// Serialize to the JSON wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse and validate a raw queue payload.
    pub fn from_bytes(payload: &[u8]) -> Result<Self, EventParseError> {
        let event: Self = serde_json::from_slice(payload)?;

        if event.user_id.trim().is_empty() {
            return Err(EventParseError::EmptyField("userId"));
        }
        if event.category.trim().is_empty() {
            return Err(EventParseError::EmptyField("category"));
        }

        Ok(event)
    }
}
