//! Field validation shared by the DB and API layers.
//!
//! Each validator returns [`CoreError::Validation`] with a message naming the
//! offending field, so handlers can surface it unchanged as a 400.

use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use validator::ValidateEmail;

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Limits
-------------------------------------------------------------------------- */

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_PERSON_NAME_LENGTH: usize = 150;
pub const MAX_NAME_LENGTH: usize = 256;
pub const MAX_SLUG_LENGTH: usize = 50;

/// Username reserved for the `/users/me` endpoint.
pub const RESERVED_USERNAME: &str = "me";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid regex"));

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid regex"));

/* --------------------------------------------------------------------------
Accounts
-------------------------------------------------------------------------- */

pub fn validate_username(username: &str) -> Result<(), CoreError> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "username must be between 1 and {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(CoreError::Validation(
            "username may only contain letters, digits and . @ + - _".to_string(),
        ));
    }
    if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
        return Err(CoreError::Validation(format!(
            "username '{username}' is reserved"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(CoreError::Validation(format!(
            "email must be at most {MAX_EMAIL_LENGTH} characters"
        )));
    }
    if !email.to_owned().validate_email() {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

/// First/last name on a profile. Empty is allowed.
pub fn validate_person_name(field: &str, value: &str) -> Result<(), CoreError> {
    if value.chars().count() > MAX_PERSON_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_PERSON_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Catalog
-------------------------------------------------------------------------- */

/// Name of a category, genre or title.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH {
        return Err(CoreError::Validation(format!(
            "slug must be between 1 and {MAX_SLUG_LENGTH} characters"
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "slug '{slug}' may only contain latin letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

/// A title's release year must not lie in the future.
pub fn validate_year(year: i32, current_year: i32) -> Result<(), CoreError> {
    if year > current_year {
        return Err(CoreError::Validation(format!(
            "year {year} is in the future"
        )));
    }
    Ok(())
}

pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/* --------------------------------------------------------------------------
Authored content
-------------------------------------------------------------------------- */

/// Review and comment bodies must contain something besides whitespace.
pub fn validate_text(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation("text must not be empty".to_string()));
    }
    Ok(())
}
