//! Handlers for the user directory and the caller's own profile.
//!
//! Profiles are public, but `email` is only shown to the owner and to admins.
//! Accounts created by an admin go through the same confirmation-code flow
//! as self-registered ones.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use yamdb_core::access::{Action, Resource};
use yamdb_core::error::CoreError;
use yamdb_core::roles::Role;
use yamdb_core::validation::{validate_email, validate_person_name, validate_username};
use yamdb_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use yamdb_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::auth::issue_confirmation_code;
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::middleware::rbac::{authorize, RequireAdmin};
use crate::query::SearchParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub role: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
}

/// Request body for `PATCH /users/me` and `PATCH /users/{username}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

impl UpdateUserRequest {
    /// Validate every present field and convert to the repository input.
    fn into_update(self) -> Result<UpdateUser, CoreError> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(first_name) = &self.first_name {
            validate_person_name("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            validate_person_name("last_name", last_name)?;
        }
        let role = self.role.as_deref().map(Role::parse).transpose()?;

        Ok(UpdateUser {
            username: self.username,
            email: self.email,
            role,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
        })
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// GET /api/v1/users
///
/// List profiles ordered by username. Emails are included for admins only.
pub async fn list_users(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.window();
    let include_email = viewer.0.as_ref().is_some_and(|v| v.role.is_admin());

    let users = UserRepo::list(&state.pool, params.search(), limit, offset).await?;
    let total = UserRepo::count(&state.pool, params.search()).await?;

    Ok(Json(ListResponse {
        data: users
            .iter()
            .map(|u| UserResponse::from_user(u, include_email))
            .collect(),
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/users
///
/// Admin-only account creation. The new user receives a confirmation code
/// and logs in through `/auth/token` like anyone else.
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    validate_username(&input.username)?;
    validate_email(&input.email)?;
    validate_person_name("first_name", &input.first_name)?;
    validate_person_name("last_name", &input.last_name)?;
    let role = input.role.as_deref().map(Role::parse).transpose()?.unwrap_or_default();

    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Username '{}' is already taken",
            input.username
        ))));
    }
    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already registered".into(),
        )));
    }

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            role,
            first_name: input.first_name,
            last_name: input.last_name,
            bio: input.bio,
        },
    )
    .await?;

    issue_confirmation_code(&state, &user).await?;

    tracing::info!(
        user_id = user.id,
        role = %role,
        admin_id = admin.user_id,
        "User created by admin",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from_user(&user, true),
        }),
    ))
}

// ---------------------------------------------------------------------------
// Own profile
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let user = find_by_id(&state, &auth).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user, true),
    }))
}

/// PATCH /api/v1/users/me
///
/// A non-admin's `role` field is ignored rather than rejected.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let mut update = input.into_update()?;
    if !auth.role.is_admin() {
        update.role = None;
    }

    let resource = Resource::Profile {
        owner_id: auth.user_id,
        changes_role: update.changes_role(),
    };
    authorize(&auth.actor(), Action::Update, &resource)?;

    let user = UserRepo::update(&state.pool, auth.user_id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    tracing::info!(user_id = user.id, "Own profile updated");

    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user, true),
    }))
}

// ---------------------------------------------------------------------------
// Profile by username
// ---------------------------------------------------------------------------

/// GET /api/v1/users/{username}
pub async fn get_user(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
) -> AppResult<impl IntoResponse> {
    let user = find_by_username(&state, &username).await?;
    let include_email = viewer
        .0
        .as_ref()
        .is_some_and(|v| v.user_id == user.id || v.role.is_admin());

    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user, include_email),
    }))
}

/// PATCH /api/v1/users/{username}
///
/// The owner may edit their own profile fields; everything else, including
/// any role change, is admin-only.
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let target = find_by_username(&state, &username).await?;
    let update = input.into_update()?;

    let resource = Resource::Profile {
        owner_id: target.id,
        changes_role: update.changes_role(),
    };
    authorize(&auth.actor(), Action::Update, &resource)?;

    let user = UserRepo::update(&state.pool, target.id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: target.id,
        }))?;

    tracing::info!(user_id = user.id, updated_by = auth.user_id, "User updated");

    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user, true),
    }))
}

/// DELETE /api/v1/users/{username}
///
/// Removes the account with its reviews and comments; affected title
/// ratings are recomputed.
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(username): AppPath<String>,
) -> AppResult<impl IntoResponse> {
    let target = find_by_username(&state, &username).await?;

    let resource = Resource::Profile {
        owner_id: target.id,
        changes_role: false,
    };
    authorize(&auth.actor(), Action::Delete, &resource)?;

    if !UserRepo::delete(&state.pool, target.id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: target.id,
        }));
    }

    tracing::info!(user_id = target.id, deleted_by = auth.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

async fn find_by_username(state: &AppState, username: &str) -> AppResult<User> {
    UserRepo::find_by_username(&state.pool, username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "User",
                key: username.to_string(),
            })
        })
}

async fn find_by_id(state: &AppState, auth: &AuthUser) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))
}
