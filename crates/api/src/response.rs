//! Shared response envelope types for API handlers.
//!
//! Responses use a `{ "data": ... }` envelope, except the recommendation
//! read which returns a bare array of names.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
