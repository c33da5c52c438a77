//! Route definitions for user preferences.

use axum::routing::get;
use axum::Router;

use crate::handlers::preferences;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /{user_id}/preferences     -> get_preference
/// POST   /{user_id}/preferences     -> update_preference
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{user_id}/preferences",
        get(preferences::get_preference).post(preferences::update_preference),
    )
}
