//! Title rating aggregation.
//!
//! The cached `titles.rating` column is only ever written from here, and only
//! on a connection that is inside the transaction performing the review
//! mutation. Callers lock the title row with [`RatingAggregator::lock_title`]
//! before touching its reviews so concurrent writers on the same title queue
//! up instead of overwriting each other's aggregate.

use sqlx::PgConnection;
use yamdb_core::rating::rating_from_totals;
use yamdb_core::types::DbId;

pub struct RatingAggregator;

impl RatingAggregator {
    /// Take a row lock on the title for the rest of the transaction.
    ///
    /// Returns `false` if the title does not exist.
    pub async fn lock_title(conn: &mut PgConnection, title_id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as("SELECT id FROM titles WHERE id = $1 FOR UPDATE")
            .bind(title_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    /// Lock several titles in id order, so two transactions touching the
    /// same set cannot deadlock.
    pub async fn lock_titles(
        conn: &mut PgConnection,
        title_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT id FROM titles WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(title_ids)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Recompute a title's rating from its current reviews and persist it.
    ///
    /// Reads through `conn`, so it sees the caller's uncommitted review
    /// mutation.
    pub async fn recompute(
        conn: &mut PgConnection,
        title_id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        let (total, count): (Option<i64>, i64) = sqlx::query_as(
            "SELECT SUM(score)::BIGINT, COUNT(*) FROM reviews WHERE title_id = $1",
        )
        .bind(title_id)
        .fetch_one(&mut *conn)
        .await?;

        let rating = rating_from_totals(total.unwrap_or(0), count);

        sqlx::query("UPDATE titles SET rating = $2 WHERE id = $1")
            .bind(title_id)
            .bind(rating)
            .execute(&mut *conn)
            .await?;

        tracing::debug!(title_id, ?rating, reviews = count, "Title rating recomputed");

        Ok(rating)
    }
}
