//! Categories and genres: two reference vocabularies with the same shape.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::types::DbId;

/// Which vocabulary table a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    Categories,
    Genres,
}

impl Vocabulary {
    pub fn table(self) -> &'static str {
        match self {
            Vocabulary::Categories => "categories",
            Vocabulary::Genres => "genres",
        }
    }

    /// Entity name used in not-found errors and log lines.
    pub fn entity(self) -> &'static str {
        match self {
            Vocabulary::Categories => "Category",
            Vocabulary::Genres => "Genre",
        }
    }
}

/// A row from `categories` or `genres`. Clients address entries by slug, so
/// the surrogate id is not serialized.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct VocabularyEntry {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// DTO for creating a category or genre.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVocabularyEntry {
    pub name: String,
    pub slug: String,
}
