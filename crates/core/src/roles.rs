//! User roles.
//!
//! Roles are stored as text in `users.role` (guarded by a CHECK constraint in
//! `20260301000001_create_users.sql`). Every write boundary parses them
//! strictly with [`Role::parse`]; every read boundary uses
//! [`Role::from_stored`], which never grants more than [`Role::User`] for a
//! value it does not recognise.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_USER: &str = "user";
pub const ROLE_MODERATOR: &str = "moderator";
pub const ROLE_ADMIN: &str = "admin";

/// All accepted role names, lowest privilege first.
pub const VALID_ROLES: &[&str] = &[ROLE_USER, ROLE_MODERATOR, ROLE_ADMIN];

/// Closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Moderator => ROLE_MODERATOR,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// Strict parse for values coming from clients.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            ROLE_USER => Ok(Role::User),
            ROLE_MODERATOR => Ok(Role::Moderator),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }

    /// Lenient parse for values already persisted. Missing or unknown roles
    /// fall back to the lowest privilege.
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(|v| Role::parse(v).ok()).unwrap_or_default()
    }

    /// Moderators and admins may edit content they did not author.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
