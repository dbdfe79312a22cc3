//! Route definitions for the `/categories` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::vocabulary;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET, POST    /         -> list_categories, create_category (admin)
/// DELETE       /{slug}   -> delete_category (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(vocabulary::list_categories).post(vocabulary::create_category),
        )
        .route("/{slug}", delete(vocabulary::delete_category))
}
