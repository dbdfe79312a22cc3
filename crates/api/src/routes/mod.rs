pub mod auth;
pub mod categories;
pub mod genres;
pub mod health;
pub mod titles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/signup, /auth/token                     public
/// /users, /users/me, /users/{username}          directory and profiles
/// /categories, /categories/{slug}               vocabulary
/// /genres, /genres/{slug}                       vocabulary
/// /titles/...                                   titles, reviews, comments
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest("/titles", titles::router())
}
