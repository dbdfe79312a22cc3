//! Handlers for titles.
//!
//! Clients reference the category and genres by slug; slugs are resolved to
//! ids here so that an unknown slug is reported as a 400 naming the slug.
//! The rating is read-only: it is maintained by the review repository.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Deserializer};
use yamdb_core::access::{Action, Resource};
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;
use yamdb_core::validation::{current_year, validate_name, validate_year};
use yamdb_db::models::title::{CreateTitle, TitleFilter, TitleResponse, UpdateTitle};
use yamdb_db::models::vocabulary::Vocabulary;
use yamdb_db::repositories::{TitleRepo, VocabularyRepo};
use yamdb_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::authorize;
use crate::query::page_window;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// Request body for `POST /titles`.
#[derive(Debug, Deserialize)]
pub struct CreateTitleRequest {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
}

/// Request body for `PATCH /titles/{id}`.
///
/// `description: null` and `category: null` clear the field; omitting
/// either leaves it unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
}

/// Distinguish an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// GET /api/v1/titles
///
/// Filters: `category` and `genre` (slugs), `name` (substring), `year`.
pub async fn list_titles(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<TitleFilter>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_window(filter.limit, filter.offset);

    let titles = TitleRepo::list(&state.pool, &filter, limit, offset).await?;
    let total = TitleRepo::count(&state.pool, &filter).await?;

    Ok(Json(ListResponse {
        data: titles,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/titles
pub async fn create_title(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTitleRequest>,
) -> AppResult<impl IntoResponse> {
    authorize(&auth.actor(), Action::Create, &Resource::Catalog)?;
    validate_name(&input.name)?;
    validate_year(input.year, current_year())?;

    let category_id = match input.category.as_deref() {
        Some(slug) => Some(resolve_category(&state.pool, slug).await?),
        None => None,
    };
    let genre_ids = resolve_genres(&state.pool, &input.genre).await?;

    let title = TitleRepo::create(
        &state.pool,
        &CreateTitle {
            name: input.name,
            year: input.year,
            description: input.description,
            category_id,
            genre_ids,
        },
    )
    .await?;

    tracing::info!(title_id = title.id, user_id = auth.user_id, "Title created");

    let response = find_response(&state.pool, title.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// GET /api/v1/titles/{id}
pub async fn get_title(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let title = find_response(&state.pool, id).await?;
    Ok(Json(DataResponse { data: title }))
}

/// PATCH /api/v1/titles/{id}
///
/// `genre`, when present, replaces the whole genre set.
pub async fn update_title(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTitleRequest>,
) -> AppResult<impl IntoResponse> {
    authorize(&auth.actor(), Action::Update, &Resource::Catalog)?;
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    if let Some(year) = input.year {
        validate_year(year, current_year())?;
    }

    let category_id = match input.category {
        Some(Some(ref slug)) => Some(Some(resolve_category(&state.pool, slug).await?)),
        Some(None) => Some(None),
        None => None,
    };
    let genre_ids = match &input.genre {
        Some(slugs) => Some(resolve_genres(&state.pool, slugs).await?),
        None => None,
    };

    let update = UpdateTitle {
        name: input.name,
        year: input.year,
        description: input.description,
        category_id,
        genre_ids,
    };
    TitleRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Title",
            id,
        }))?;

    tracing::info!(title_id = id, user_id = auth.user_id, "Title updated");

    let response = find_response(&state.pool, id).await?;
    Ok(Json(DataResponse { data: response }))
}

/// DELETE /api/v1/titles/{id}
///
/// Reviews and their comments are removed with the title.
pub async fn delete_title(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    authorize(&auth.actor(), Action::Delete, &Resource::Catalog)?;

    if !TitleRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Title",
            id,
        }));
    }

    tracing::info!(title_id = id, user_id = auth.user_id, "Title deleted");

    Ok(StatusCode::NO_CONTENT)
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

async fn find_response(pool: &DbPool, id: DbId) -> AppResult<TitleResponse> {
    TitleRepo::find_response(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Title",
            id,
        }))
}

async fn resolve_category(pool: &DbPool, slug: &str) -> AppResult<DbId> {
    VocabularyRepo::find_by_slug(pool, Vocabulary::Categories, slug)
        .await?
        .map(|c| c.id)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!("Unknown category '{slug}'")))
        })
}

async fn resolve_genres(pool: &DbPool, slugs: &[String]) -> AppResult<Vec<DbId>> {
    let mut wanted = slugs.to_vec();
    wanted.sort();
    wanted.dedup();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let found = VocabularyRepo::find_by_slugs(pool, Vocabulary::Genres, &wanted).await?;
    if found.len() != wanted.len() {
        let missing: Vec<&str> = wanted
            .iter()
            .filter(|slug| !found.iter().any(|g| &g.slug == *slug))
            .map(String::as_str)
            .collect();
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown genre(s): {}",
            missing.join(", ")
        ))));
    }

    Ok(found.into_iter().map(|g| g.id).collect())
}
