//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::roles::Role;
use yamdb_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the confirmation-code hash -- NEVER serialize this to API
/// responses directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub confirmation_code_hash: Option<String>,
    pub confirmation_code_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// The stored role, degraded to [`Role::User`] if the column holds
    /// anything unexpected.
    pub fn role(&self) -> Role {
        Role::from_stored(Some(&self.role))
    }
}

/// Profile representation for API responses.
///
/// `email` is only present when the reader is the profile owner or an admin.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl UserResponse {
    pub fn from_user(user: &User, include_email: bool) -> Self {
        Self {
            username: user.username.clone(),
            email: include_email.then(|| user.email.clone()),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            bio: user.bio.clone(),
            role: user.role(),
        }
    }
}

/// Input for inserting a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
}

impl CreateUser {
    /// A fresh self-registered account: role `user`, empty profile.
    pub fn signup(username: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            role: Role::User,
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
        }
    }
}

/// Partial update of a user. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
}

impl UpdateUser {
    pub fn changes_role(&self) -> bool {
        self.role.is_some()
    }
}
