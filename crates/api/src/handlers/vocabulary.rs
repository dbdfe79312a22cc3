//! Handlers for categories and genres.
//!
//! Both vocabularies share one implementation parameterized by
//! [`Vocabulary`]; the public handlers below only pick the table. Reads are
//! public, mutations are admin-only.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use yamdb_core::access::{Action, Resource};
use yamdb_core::error::CoreError;
use yamdb_core::validation::{validate_name, validate_slug};
use yamdb_db::models::vocabulary::{CreateVocabularyEntry, Vocabulary};
use yamdb_db::repositories::VocabularyRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::authorize;
use crate::query::SearchParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    list_entries(&state, Vocabulary::Categories, &params).await
}

/// POST /api/v1/categories
pub async fn create_category(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateVocabularyEntry>,
) -> AppResult<impl IntoResponse> {
    create_entry(&state, &auth, Vocabulary::Categories, input).await
}

/// DELETE /api/v1/categories/{slug}
///
/// Titles in the category stay, with no category.
pub async fn delete_category(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<impl IntoResponse> {
    delete_entry(&state, &auth, Vocabulary::Categories, &slug).await
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

/// GET /api/v1/genres
pub async fn list_genres(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    list_entries(&state, Vocabulary::Genres, &params).await
}

/// POST /api/v1/genres
pub async fn create_genre(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateVocabularyEntry>,
) -> AppResult<impl IntoResponse> {
    create_entry(&state, &auth, Vocabulary::Genres, input).await
}

/// DELETE /api/v1/genres/{slug}
pub async fn delete_genre(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> AppResult<impl IntoResponse> {
    delete_entry(&state, &auth, Vocabulary::Genres, &slug).await
}

/* --------------------------------------------------------------------------
Shared implementation
-------------------------------------------------------------------------- */

async fn list_entries(
    state: &AppState,
    vocabulary: Vocabulary,
    params: &SearchParams,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.window();
    let entries =
        VocabularyRepo::list(&state.pool, vocabulary, params.search(), limit, offset).await?;
    let total = VocabularyRepo::count(&state.pool, vocabulary, params.search()).await?;

    Ok(Json(ListResponse {
        data: entries,
        total,
        limit,
        offset,
    }))
}

async fn create_entry(
    state: &AppState,
    auth: &AuthUser,
    vocabulary: Vocabulary,
    input: CreateVocabularyEntry,
) -> AppResult<impl IntoResponse> {
    authorize(&auth.actor(), Action::Create, &Resource::Catalog)?;
    validate_name(&input.name)?;
    validate_slug(&input.slug)?;

    if VocabularyRepo::find_by_slug(&state.pool, vocabulary, &input.slug)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "{} with slug '{}' already exists",
            vocabulary.entity(),
            input.slug
        ))));
    }

    let entry = VocabularyRepo::create(&state.pool, vocabulary, &input).await?;

    tracing::info!(
        entity = vocabulary.entity(),
        slug = %entry.slug,
        user_id = auth.user_id,
        "Vocabulary entry created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

async fn delete_entry(
    state: &AppState,
    auth: &AuthUser,
    vocabulary: Vocabulary,
    slug: &str,
) -> AppResult<impl IntoResponse> {
    authorize(&auth.actor(), Action::Delete, &Resource::Catalog)?;

    if !VocabularyRepo::delete_by_slug(&state.pool, vocabulary, slug).await? {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: vocabulary.entity(),
            key: slug.to_string(),
        }));
    }

    tracing::info!(
        entity = vocabulary.entity(),
        slug,
        user_id = auth.user_id,
        "Vocabulary entry deleted",
    );

    Ok(StatusCode::NO_CONTENT)
}
