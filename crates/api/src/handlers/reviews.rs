//! Handlers for reviews, nested under a title.
//!
//! Each mutation recomputes the parent title's rating in the same database
//! transaction (see `ReviewRepo`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::access::{Action, Resource};
use yamdb_core::error::CoreError;
use yamdb_core::rating::validate_score;
use yamdb_core::types::DbId;
use yamdb_core::validation::validate_text;
use yamdb_db::models::review::{CreateReview, Review, ReviewResponse, UpdateReview};
use yamdb_db::repositories::{ReviewRepo, TitleRepo};
use yamdb_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::authorize;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// GET /api/v1/titles/{title_id}/reviews
///
/// Newest first.
pub async fn list_reviews(
    State(state): State<AppState>,
    AppPath(title_id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    ensure_title_exists(&state.pool, title_id).await?;
    let (limit, offset) = params.window();

    let reviews = ReviewRepo::list_for_title(&state.pool, title_id, limit, offset).await?;
    let total = ReviewRepo::count_for_title(&state.pool, title_id).await?;

    Ok(Json(ListResponse {
        data: reviews,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/titles/{title_id}/reviews
///
/// One review per author per title; a second attempt is a 409.
pub async fn create_review(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(title_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateReview>,
) -> AppResult<impl IntoResponse> {
    authorize(&auth.actor(), Action::Create, &Resource::NewAuthored)?;
    validate_text(&input.text)?;
    validate_score(input.score)?;

    ensure_title_exists(&state.pool, title_id).await?;
    if ReviewRepo::exists_for_author(&state.pool, title_id, auth.user_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "You have already reviewed this title".into(),
        )));
    }

    let review = ReviewRepo::create(&state.pool, title_id, auth.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Title",
            id: title_id,
        }))?;

    tracing::info!(
        review_id = review.id,
        title_id,
        score = review.score,
        user_id = auth.user_id,
        "Review created",
    );

    let response = find_response(&state.pool, review.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let review = find_review(&state.pool, title_id, review_id).await?;
    let response = find_response(&state.pool, review.id).await?;
    Ok(Json(DataResponse { data: response }))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Author, moderator or admin.
pub async fn update_review(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateReview>,
) -> AppResult<impl IntoResponse> {
    let review = find_review(&state.pool, title_id, review_id).await?;
    authorize(&auth.actor(), Action::Update, &Resource::authored(&review))?;

    if let Some(text) = &input.text {
        validate_text(text)?;
    }
    if let Some(score) = input.score {
        validate_score(score)?;
    }

    ReviewRepo::update(&state.pool, &review, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Review",
            id: review_id,
        }))?;

    tracing::info!(review_id, title_id, user_id = auth.user_id, "Review updated");

    let response = find_response(&state.pool, review_id).await?;
    Ok(Json(DataResponse { data: response }))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Author, moderator or admin. Comments on the review go with it.
pub async fn delete_review(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let review = find_review(&state.pool, title_id, review_id).await?;
    authorize(&auth.actor(), Action::Delete, &Resource::authored(&review))?;

    if !ReviewRepo::delete(&state.pool, &review).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Review",
            id: review_id,
        }));
    }

    tracing::info!(review_id, title_id, user_id = auth.user_id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

async fn ensure_title_exists(pool: &DbPool, title_id: DbId) -> AppResult<()> {
    TitleRepo::find_by_id(pool, title_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Title",
            id: title_id,
        }))
}

/// Load a review, requiring it to belong to `title_id`.
pub(crate) async fn find_review(
    pool: &DbPool,
    title_id: DbId,
    review_id: DbId,
) -> AppResult<Review> {
    ReviewRepo::find_for_title(pool, title_id, review_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Review",
            id: review_id,
        }))
}

async fn find_response(pool: &DbPool, review_id: DbId) -> AppResult<ReviewResponse> {
    ReviewRepo::find_response(pool, review_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Review",
            id: review_id,
        }))
}
