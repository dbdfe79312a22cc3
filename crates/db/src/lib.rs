//! PostgreSQL persistence for the YaMDb service.
//!
//! - [`models`] -- row structs, response projections and repository inputs.
//! - [`repositories`] -- zero-sized repos with async CRUD over `&PgPool`.
//! - [`rating`] -- title rating recomputation, run inside review transactions.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod rating;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
