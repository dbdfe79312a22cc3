//! Handlers for the signup and token exchange flow.
//!
//! A client registers a username/email pair, receives a one-time code out of
//! band, and trades that code for a JWT. There are no passwords.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use yamdb_core::confirmation::{expires_at, generate_code, is_expired, is_well_formed};
use yamdb_core::error::CoreError;
use yamdb_core::validation::{validate_email, validate_username};
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::repositories::UserRepo;
use yamdb_notify::ConfirmationMessage;

use crate::auth::code::{hash_code, verify_code};
use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

/// Response body for `POST /auth/signup`: the accepted pair, echoed back.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

/// Response body for `POST /auth/token`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/v1/auth/signup
///
/// Register a username/email pair and send it a confirmation code. Signing up
/// again with the exact same pair does not create a second account; it issues
/// a fresh code, invalidating the previous one.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<Json<SignupResponse>> {
    validate_username(&input.username)?;
    validate_email(&input.email)?;

    let by_username = UserRepo::find_by_username(&state.pool, &input.username).await?;
    let by_email = UserRepo::find_by_email(&state.pool, &input.email).await?;

    let user = match (by_username, by_email) {
        (None, None) => {
            let user =
                UserRepo::create(&state.pool, &CreateUser::signup(&input.username, &input.email))
                    .await?;
            tracing::info!(user_id = user.id, username = %user.username, "User signed up");
            user
        }
        (Some(existing), Some(same)) if existing.id == same.id => {
            tracing::info!(user_id = existing.id, "Confirmation code re-requested");
            existing
        }
        (Some(_), _) => {
            return Err(AppError::Core(CoreError::Conflict(
                "Username is already registered with a different email".into(),
            )));
        }
        (None, Some(_)) => {
            return Err(AppError::Core(CoreError::Conflict(
                "Email is already registered with a different username".into(),
            )));
        }
    };

    issue_confirmation_code(&state, &user).await?;

    Ok(Json(SignupResponse {
        username: user.username,
        email: user.email,
    }))
}

/// POST /api/v1/auth/token
///
/// Exchange a confirmation code for an access token. A code works once and
/// only until it expires.
pub async fn token(
    State(state): State<AppState>,
    AppJson(input): AppJson<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "User",
                key: input.username.clone(),
            })
        })?;

    let Some(stored_hash) = user.confirmation_code_hash.as_deref() else {
        return Err(AppError::Core(CoreError::InvalidConfirmationCode));
    };
    if is_expired(user.confirmation_code_expires_at, Utc::now())
        || !is_well_formed(&input.confirmation_code)
    {
        return Err(AppError::Core(CoreError::InvalidConfirmationCode));
    }

    let matches = verify_code(&input.confirmation_code, stored_hash)
        .map_err(|e| AppError::InternalError(format!("Stored code hash is unreadable: {e}")))?;
    if !matches {
        tracing::info!(user_id = user.id, "Rejected confirmation code");
        return Err(AppError::Core(CoreError::InvalidConfirmationCode));
    }

    // Lost a race with a concurrent exchange of the same code.
    if !UserRepo::consume_confirmation_code(&state.pool, user.id, stored_hash).await? {
        return Err(AppError::Core(CoreError::InvalidConfirmationCode));
    }

    let token = generate_access_token(user.id, &user.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse { token }))
}

/// Generate a code for `user`, store its hash, and deliver the plaintext.
///
/// Any previously issued code stops working.
pub(crate) async fn issue_confirmation_code(state: &AppState, user: &User) -> AppResult<()> {
    let code = generate_code();
    let code_hash = hash_code(&code)
        .map_err(|e| AppError::InternalError(format!("Code hashing failed: {e}")))?;
    let expires = expires_at(Utc::now(), state.config.confirmation_code_ttl_mins);

    UserRepo::set_confirmation_code(&state.pool, user.id, &code_hash, expires).await?;

    let message = ConfirmationMessage {
        username: user.username.clone(),
        email: user.email.clone(),
        code,
    };
    state
        .mailer
        .send_confirmation(&message)
        .await
        .map_err(|e| AppError::InternalError(format!("Confirmation delivery failed: {e}")))?;

    tracing::debug!(user_id = user.id, expires_at = %expires, "Confirmation code issued");
    Ok(())
}
