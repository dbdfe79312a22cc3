//! Route definitions for the `/genres` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::vocabulary;
use crate::state::AppState;

/// Routes mounted at `/genres`.
///
/// ```text
/// GET, POST    /         -> list_genres, create_genre (admin)
/// DELETE       /{slug}   -> delete_genre (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(vocabulary::list_genres).post(vocabulary::create_genre))
        .route("/{slug}", delete(vocabulary::delete_genre))
}
