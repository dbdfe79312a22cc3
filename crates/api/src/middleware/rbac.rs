//! Access control at the handler boundary.
//!
//! Every decision goes through [`yamdb_core::access::decide`]. This module only
//! turns a denial into the right HTTP error: 401 when the caller is anonymous
//! (they should authenticate), 403 when they are authenticated but lack the
//! permission.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use yamdb_core::access::{decide, Action, Actor, Decision, Resource};
use yamdb_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Ask the policy whether `actor` may perform `action` on `resource`.
pub fn authorize(actor: &Actor, action: Action, resource: &Resource) -> AppResult<()> {
    match decide(actor, action, resource) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(denied(actor)),
    }
}

fn denied(actor: &Actor) -> AppError {
    match actor {
        Actor::Anonymous => {
            AppError::Core(CoreError::Unauthorized("Authentication required".into()))
        }
        Actor::User { .. } => AppError::Core(CoreError::Forbidden(
            "You do not have permission to perform this action".into(),
        )),
    }
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize(&user.actor(), Action::Create, &Resource::UserDirectory)?;
        Ok(RequireAdmin(user))
    }
}
