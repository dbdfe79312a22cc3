//! Shared shape of user-authored content.

use crate::types::DbId;

/// A piece of content written by a single user: reviews and comments.
///
/// Ownership checks in [`crate::access`] go through this trait, so reviews
/// and comments share one rule.
pub trait Authored {
    fn author_id(&self) -> DbId;
}
