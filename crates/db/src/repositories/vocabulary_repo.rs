//! Repository for the `categories` and `genres` tables.

use sqlx::PgPool;
use yamdb_core::types::DbId;

use crate::models::vocabulary::{CreateVocabularyEntry, Vocabulary, VocabularyEntry};
use crate::repositories::contains_pattern;

/// Column list shared by both vocabulary tables.
const COLUMNS: &str = "id, name, slug";

/// Provides create/list/delete for categories and genres. The table is
/// selected by the [`Vocabulary`] argument.
pub struct VocabularyRepo;

impl VocabularyRepo {
    /// Insert a new entry, returning the created row.
    pub async fn create(
        pool: &PgPool,
        vocabulary: Vocabulary,
        input: &CreateVocabularyEntry,
    ) -> Result<VocabularyEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}",
            vocabulary.table()
        );
        sqlx::query_as::<_, VocabularyEntry>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// Find an entry by slug.
    pub async fn find_by_slug(
        pool: &PgPool,
        vocabulary: Vocabulary,
        slug: &str,
    ) -> Result<Option<VocabularyEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE slug = $1",
            vocabulary.table()
        );
        sqlx::query_as::<_, VocabularyEntry>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a set of slugs to rows. Unknown slugs are simply absent from
    /// the result; callers compare lengths to detect them.
    pub async fn find_by_slugs(
        pool: &PgPool,
        vocabulary: Vocabulary,
        slugs: &[String],
    ) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE slug = ANY($1) ORDER BY id",
            vocabulary.table()
        );
        sqlx::query_as::<_, VocabularyEntry>(&query)
            .bind(slugs)
            .fetch_all(pool)
            .await
    }

    /// List entries ordered by name, optionally filtered by a name substring.
    pub async fn list(
        pool: &PgPool,
        vocabulary: Vocabulary,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {}
             WHERE ($1::TEXT IS NULL OR name ILIKE $1)
             ORDER BY name, id
             LIMIT $2 OFFSET $3",
            vocabulary.table()
        );
        sqlx::query_as::<_, VocabularyEntry>(&query)
            .bind(search.map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count entries matching the same filter as [`VocabularyRepo::list`].
    pub async fn count(
        pool: &PgPool,
        vocabulary: Vocabulary,
        search: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM {} WHERE ($1::TEXT IS NULL OR name ILIKE $1)",
            vocabulary.table()
        );
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(search.map(contains_pattern))
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Delete an entry by slug. Returns `true` if a row was removed.
    ///
    /// Titles referencing a deleted category keep existing with no category;
    /// genre links are dropped by the `title_genres` cascade.
    pub async fn delete_by_slug(
        pool: &PgPool,
        vocabulary: Vocabulary,
        slug: &str,
    ) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE slug = $1", vocabulary.table());
        let result = sqlx::query(&query).bind(slug).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch entries by id, used to resolve a title's category.
    pub async fn find_by_ids(
        pool: &PgPool,
        vocabulary: Vocabulary,
        ids: &[DbId],
    ) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE id = ANY($1)",
            vocabulary.table()
        );
        sqlx::query_as::<_, VocabularyEntry>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
