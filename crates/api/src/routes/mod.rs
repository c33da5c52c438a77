pub mod health;
pub mod preferences;
pub mod recommendations;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /recommendations/{user_id}                 cached set, or ?category= preview
/// /users/{user_id}/preferences               get, update
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/recommendations", recommendations::router())
        .nest("/users", preferences::router())
}
