//! Repository for the `reviews` table.
//!
//! Every mutation runs in a transaction that first locks the parent title,
//! then changes the review, then recomputes the title rating. The rating a
//! reader sees is therefore always the mean of the committed review set.

use sqlx::PgPool;
use yamdb_core::types::DbId;

use crate::models::review::{CreateReview, Review, ReviewResponse, UpdateReview};
use crate::rating::RatingAggregator;

/// Column list for the `reviews` table.
const COLUMNS: &str = "id, author_id, title_id, text, score, pub_date";

/// Projection joining the author's username.
const RESPONSE_COLUMNS: &str = "r.id, r.text, u.username AS author, r.score, r.pub_date";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review and refresh the title rating.
    ///
    /// Returns `None` if the title disappeared before the lock was taken.
    /// A second review by the same author on the same title fails with the
    /// `uq_reviews_author_title` unique violation.
    pub async fn create(
        pool: &PgPool,
        title_id: DbId,
        author_id: DbId,
        input: &CreateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !RatingAggregator::lock_title(&mut tx, title_id).await? {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO reviews (author_id, title_id, text, score)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(author_id)
            .bind(title_id)
            .bind(&input.text)
            .bind(input.score)
            .fetch_one(&mut *tx)
            .await?;

        RatingAggregator::recompute(&mut tx, title_id).await?;

        tx.commit().await?;
        Ok(Some(review))
    }

    /// Find a review by ID, scoped to its title.
    pub async fn find_for_title(
        pool: &PgPool,
        title_id: DbId,
        id: DbId,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1 AND title_id = $2");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(title_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a review projection by ID.
    pub async fn find_response(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ReviewResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM reviews r
             JOIN users u ON u.id = r.author_id
             WHERE r.id = $1"
        );
        sqlx::query_as::<_, ReviewResponse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `author_id` has already reviewed `title_id`.
    pub async fn exists_for_author(
        pool: &PgPool,
        title_id: DbId,
        author_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE title_id = $1 AND author_id = $2)",
        )
        .bind(title_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
    }

    /// List a title's reviews, newest first.
    pub async fn list_for_title(
        pool: &PgPool,
        title_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReviewResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM reviews r
             JOIN users u ON u.id = r.author_id
             WHERE r.title_id = $1
             ORDER BY r.pub_date DESC, r.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ReviewResponse>(&query)
            .bind(title_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count a title's reviews.
    pub async fn count_for_title(pool: &PgPool, title_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title_id)
            .fetch_one(pool)
            .await
    }

    /// Update a review's text and/or score and refresh the title rating.
    ///
    /// Returns `None` if the review was deleted concurrently.
    pub async fn update(
        pool: &PgPool,
        review: &Review,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        RatingAggregator::lock_title(&mut tx, review.title_id).await?;

        let query = format!(
            "UPDATE reviews SET
                text = COALESCE($2, text),
                score = COALESCE($3, score)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Review>(&query)
            .bind(review.id)
            .bind(&input.text)
            .bind(input.score)
            .fetch_optional(&mut *tx)
            .await?;

        if updated.is_some() {
            RatingAggregator::recompute(&mut tx, review.title_id).await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a review (and its comments) and refresh the title rating.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, review: &Review) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        RatingAggregator::lock_title(&mut tx, review.title_id).await?;

        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review.id)
            .execute(&mut *tx)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            RatingAggregator::recompute(&mut tx, review.title_id).await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }
}
