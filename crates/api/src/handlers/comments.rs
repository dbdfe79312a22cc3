//! Handlers for comments, nested under a review under a title.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::access::{Action, Resource};
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;
use yamdb_core::validation::validate_text;
use yamdb_db::models::comment::{Comment, CommentInput, CommentResponse};
use yamdb_db::repositories::CommentRepo;
use yamdb_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::reviews::find_review;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::authorize;
use crate::query::PaginationParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    find_review(&state.pool, title_id, review_id).await?;
    let (limit, offset) = params.window();

    let comments = CommentRepo::list_for_review(&state.pool, review_id, limit, offset).await?;
    let total = CommentRepo::count_for_review(&state.pool, review_id).await?;

    Ok(Json(ListResponse {
        data: comments,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<CommentInput>,
) -> AppResult<impl IntoResponse> {
    authorize(&auth.actor(), Action::Create, &Resource::NewAuthored)?;
    validate_text(&input.text)?;
    find_review(&state.pool, title_id, review_id).await?;

    let comment = CommentRepo::create(&state.pool, review_id, auth.user_id, &input.text).await?;

    tracing::info!(
        comment_id = comment.id,
        review_id,
        user_id = auth.user_id,
        "Comment created",
    );

    let response = find_response(&state.pool, comment.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<AppState>,
    AppPath((title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let comment = find_comment(&state.pool, title_id, review_id, comment_id).await?;
    let response = find_response(&state.pool, comment.id).await?;
    Ok(Json(DataResponse { data: response }))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn update_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
    AppJson(input): AppJson<CommentInput>,
) -> AppResult<impl IntoResponse> {
    let comment = find_comment(&state.pool, title_id, review_id, comment_id).await?;
    authorize(&auth.actor(), Action::Update, &Resource::authored(&comment))?;
    validate_text(&input.text)?;

    CommentRepo::update(&state.pool, comment_id, &input.text)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        }))?;

    tracing::info!(comment_id, review_id, user_id = auth.user_id, "Comment updated");

    let response = find_response(&state.pool, comment_id).await?;
    Ok(Json(DataResponse { data: response }))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath((title_id, review_id, comment_id)): AppPath<(DbId, DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let comment = find_comment(&state.pool, title_id, review_id, comment_id).await?;
    authorize(&auth.actor(), Action::Delete, &Resource::authored(&comment))?;

    if !CommentRepo::delete(&state.pool, comment_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        }));
    }

    tracing::info!(comment_id, review_id, user_id = auth.user_id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

/// Load a comment, requiring the whole path (title, review, comment) to line up.
async fn find_comment(
    pool: &DbPool,
    title_id: DbId,
    review_id: DbId,
    comment_id: DbId,
) -> AppResult<Comment> {
    find_review(pool, title_id, review_id).await?;
    CommentRepo::find_for_review(pool, review_id, comment_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        }))
}

async fn find_response(pool: &DbPool, comment_id: DbId) -> AppResult<CommentResponse> {
    CommentRepo::find_response(pool, comment_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id: comment_id,
        }))
}
