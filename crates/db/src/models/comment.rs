//! Comment entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::authored::Authored;
use yamdb_core::types::{DbId, Timestamp};

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: DbId,
    pub author_id: DbId,
    pub review_id: DbId,
    pub text: String,
    pub pub_date: Timestamp,
}

impl Authored for Comment {
    fn author_id(&self) -> DbId {
        self.author_id
    }
}

/// Comment as returned by the API, with the author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentResponse {
    pub id: DbId,
    pub text: String,
    pub author: String,
    pub pub_date: Timestamp,
}

/// Request body for creating or replacing a comment's text.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub text: String,
}
