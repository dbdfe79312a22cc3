//! Repository for the `titles` and `title_genres` tables.

use std::collections::HashMap;

use sqlx::{FromRow, PgConnection, PgPool};
use yamdb_core::types::DbId;

use crate::models::title::{CreateTitle, Title, TitleFilter, TitleResponse, UpdateTitle};
use crate::models::vocabulary::{Vocabulary, VocabularyEntry};
use crate::repositories::{contains_pattern, VocabularyRepo};

/// Column list for the `titles` table, prefixed for joined queries.
const COLUMNS: &str = "t.id, t.name, t.year, t.description, t.category_id, t.rating";

/// Filter clause shared by [`TitleRepo::list`] and [`TitleRepo::count`].
///
/// `$1` category slug, `$2` genre slug, `$3` name pattern, `$4` year.
const FILTER: &str = "($1::TEXT IS NULL OR c.slug = $1)
    AND ($2::TEXT IS NULL OR EXISTS (
        SELECT 1 FROM title_genres tg
        JOIN genres g ON g.id = tg.genre_id
        WHERE tg.title_id = t.id AND g.slug = $2))
    AND ($3::TEXT IS NULL OR t.name ILIKE $3)
    AND ($4::INTEGER IS NULL OR t.year = $4)";

/// A genre joined with the title it belongs to.
#[derive(Debug, FromRow)]
struct TitleGenreRow {
    title_id: DbId,
    id: DbId,
    name: String,
    slug: String,
}

/// Provides CRUD operations for titles and their genre associations.
pub struct TitleRepo;

impl TitleRepo {
    /// Insert a new title and its genre links in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateTitle) -> Result<Title, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let title = sqlx::query_as::<_, Title>(
            "INSERT INTO titles (name, year, description, category_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, year, description, category_id, rating",
        )
        .bind(&input.name)
        .bind(input.year)
        .bind(&input.description)
        .bind(input.category_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::set_genres_inner(&mut tx, title.id, &input.genre_ids).await?;

        tx.commit().await?;
        Ok(title)
    }

    /// Find a title row by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Title>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM titles t WHERE t.id = $1");
        sqlx::query_as::<_, Title>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a title by ID with category and genres resolved.
    pub async fn find_response(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TitleResponse>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(title) => {
                let mut responses = Self::enrich(pool, vec![title]).await?;
                Ok(responses.pop())
            }
            None => Ok(None),
        }
    }

    /// List titles matching `filter`, newest id first.
    pub async fn list(
        pool: &PgPool,
        filter: &TitleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TitleResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM titles t
             LEFT JOIN categories c ON c.id = t.category_id
             WHERE {FILTER}
             ORDER BY t.id DESC
             LIMIT $5 OFFSET $6"
        );
        let titles = sqlx::query_as::<_, Title>(&query)
            .bind(&filter.category)
            .bind(&filter.genre)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.year)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Self::enrich(pool, titles).await
    }

    /// Count titles matching `filter`.
    pub async fn count(pool: &PgPool, filter: &TitleFilter) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM titles t
             LEFT JOIN categories c ON c.id = t.category_id
             WHERE {FILTER}"
        );
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(&filter.category)
            .bind(&filter.genre)
            .bind(filter.name.as_deref().map(contains_pattern))
            .bind(filter.year)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Update a title. Only non-`None` fields are applied; `Some(None)`
    /// clears `description` or `category_id`, and `genre_ids` replaces the
    /// whole set when present.
    ///
    /// Returns `None` if no row with the given `id` exists. The rating is not
    /// writable here; it belongs to [`crate::rating::RatingAggregator`].
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTitle,
    ) -> Result<Option<Title>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let title = sqlx::query_as::<_, Title>(
            "UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                category_id = CASE WHEN $6 THEN $7 ELSE category_id END
             WHERE id = $1
             RETURNING id, name, year, description, category_id, rating",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.year)
        .bind(input.description.is_some())
        .bind(input.description.as_ref().and_then(|d| d.as_deref()))
        .bind(input.category_id.is_some())
        .bind(input.category_id.flatten())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(title) = title else {
            return Ok(None);
        };

        if let Some(genre_ids) = &input.genre_ids {
            sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::set_genres_inner(&mut tx, id, genre_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(title))
    }

    /// Delete a title. Reviews and their comments go with it.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert genre links for a title inside an open transaction.
    async fn set_genres_inner(
        conn: &mut PgConnection,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        if genre_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO title_genres (title_id, genre_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(title_id)
        .bind(genre_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Resolve categories and genres for a batch of titles with two queries.
    async fn enrich(pool: &PgPool, titles: Vec<Title>) -> Result<Vec<TitleResponse>, sqlx::Error> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let title_ids: Vec<DbId> = titles.iter().map(|t| t.id).collect();
        let category_ids: Vec<DbId> = titles.iter().filter_map(|t| t.category_id).collect();

        let categories: HashMap<DbId, VocabularyEntry> =
            VocabularyRepo::find_by_ids(pool, Vocabulary::Categories, &category_ids)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect();

        let genre_rows = sqlx::query_as::<_, TitleGenreRow>(
            "SELECT tg.title_id, g.id, g.name, g.slug
             FROM title_genres tg
             JOIN genres g ON g.id = tg.genre_id
             WHERE tg.title_id = ANY($1)
             ORDER BY g.name",
        )
        .bind(&title_ids)
        .fetch_all(pool)
        .await?;

        let mut genres: HashMap<DbId, Vec<VocabularyEntry>> = HashMap::new();
        for row in genre_rows {
            genres.entry(row.title_id).or_default().push(VocabularyEntry {
                id: row.id,
                name: row.name,
                slug: row.slug,
            });
        }

        Ok(titles
            .into_iter()
            .map(|t| TitleResponse {
                category: t.category_id.and_then(|id| categories.get(&id).cloned()),
                genre: genres.remove(&t.id).unwrap_or_default(),
                id: t.id,
                name: t.name,
                year: t.year,
                description: t.description,
                rating: t.rating,
            })
            .collect())
    }
}
