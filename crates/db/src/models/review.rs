//! Review entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::authored::Authored;
use yamdb_core::types::{DbId, Timestamp};

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: DbId,
    pub author_id: DbId,
    pub title_id: DbId,
    pub text: String,
    pub score: i32,
    pub pub_date: Timestamp,
}

impl Authored for Review {
    fn author_id(&self) -> DbId {
        self.author_id
    }
}

/// Review as returned by the API, with the author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewResponse {
    pub id: DbId,
    pub text: String,
    pub author: String,
    pub score: i32,
    pub pub_date: Timestamp,
}

/// Request body for `POST /titles/{id}/reviews`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub text: String,
    pub score: i32,
}

/// Request body for `PATCH /titles/{id}/reviews/{review_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub text: Option<String>,
    pub score: Option<i32>,
}
