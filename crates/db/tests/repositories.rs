//! Repository integration tests against a real database.
//!
//! - Rating recomputation on every review mutation
//! - Cascades from users and titles
//! - Unique and check constraints
//! - Single-use confirmation codes

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_db::models::review::{CreateReview, UpdateReview};
use yamdb_db::models::title::{CreateTitle, TitleFilter, UpdateTitle};
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::models::vocabulary::{CreateVocabularyEntry, Vocabulary};
use yamdb_db::rating::RatingAggregator;
use yamdb_db::repositories::{CommentRepo, ReviewRepo, TitleRepo, UserRepo, VocabularyRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(pool: &PgPool, username: &str) -> User {
    UserRepo::create(pool, &CreateUser::signup(username, &format!("{username}@example.com")))
        .await
        .unwrap()
}

async fn title(pool: &PgPool, name: &str) -> i64 {
    TitleRepo::create(
        pool,
        &CreateTitle {
            name: name.to_string(),
            year: 2001,
            description: Some("test".into()),
            category_id: None,
            genre_ids: Vec::new(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn review(pool: &PgPool, title_id: i64, author_id: i64, score: i32) -> i64 {
    ReviewRepo::create(
        pool,
        title_id,
        author_id,
        &CreateReview {
            text: "text".into(),
            score,
        },
    )
    .await
    .unwrap()
    .expect("title exists")
    .id
}

async fn rating(pool: &PgPool, title_id: i64) -> Option<i32> {
    TitleRepo::find_by_id(pool, title_id).await.unwrap().unwrap().rating
}

fn constraint_of(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.constraint().map(str::to_string),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn rating_tracks_create_update_delete(pool: PgPool) {
    let t = title(&pool, "Amelie").await;
    let a = user(&pool, "a").await;
    let b = user(&pool, "b").await;
    let c = user(&pool, "c").await;

    assert_eq!(rating(&pool, t).await, None);

    let ra = review(&pool, t, a.id, 10).await;
    review(&pool, t, b.id, 7).await;
    assert_eq!(rating(&pool, t).await, Some(9)); // 8.5

    review(&pool, t, c.id, 1).await;
    assert_eq!(rating(&pool, t).await, Some(6)); // 6.0

    let ra_row = ReviewRepo::find_for_title(&pool, t, ra).await.unwrap().unwrap();
    ReviewRepo::update(
        &pool,
        &ra_row,
        &UpdateReview {
            text: None,
            score: Some(4),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(rating(&pool, t).await, Some(4)); // 4.0

    let ra_row = ReviewRepo::find_for_title(&pool, t, ra).await.unwrap().unwrap();
    assert!(ReviewRepo::delete(&pool, &ra_row).await.unwrap());
    assert_eq!(rating(&pool, t).await, Some(4)); // 4.0

    assert!(!ReviewRepo::delete(&pool, &ra_row).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rating_is_not_writable_through_title_update(pool: PgPool) {
    let t = title(&pool, "Brazil").await;
    let a = user(&pool, "a").await;
    review(&pool, t, a.id, 3).await;

    TitleRepo::update(
        &pool,
        t,
        &UpdateTitle {
            name: Some("Brazil (1985)".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(rating(&pool, t).await, Some(3));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn review_on_missing_title_returns_none(pool: PgPool) {
    let a = user(&pool, "a").await;
    let result = ReviewRepo::create(
        &pool,
        9_999,
        a.id,
        &CreateReview {
            text: "ghost".into(),
            score: 5,
        },
    )
    .await
    .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_user_recomputes_their_titles(pool: PgPool) {
    let t1 = title(&pool, "One").await;
    let t2 = title(&pool, "Two").await;
    let leaving = user(&pool, "leaving").await;
    let staying = user(&pool, "staying").await;

    review(&pool, t1, leaving.id, 10).await;
    review(&pool, t2, leaving.id, 10).await;
    review(&pool, t1, staying.id, 2).await;
    assert_eq!(rating(&pool, t1).await, Some(6));

    assert!(UserRepo::delete(&pool, leaving.id).await.unwrap());

    assert_eq!(rating(&pool, t1).await, Some(2));
    assert_eq!(rating(&pool, t2).await, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_user_sees_their_in_flight_review(pool: PgPool) {
    let t = title(&pool, "Contested").await;
    let racer = user(&pool, "racer").await;

    // Same steps as ReviewRepo::create, held open across the delete.
    let mut tx = pool.begin().await.unwrap();
    assert!(RatingAggregator::lock_title(&mut tx, t).await.unwrap());
    sqlx::query(
        "INSERT INTO reviews (author_id, title_id, text, score) VALUES ($1, $2, 'late', 7)",
    )
    .bind(racer.id)
    .bind(t)
    .execute(&mut *tx)
    .await
    .unwrap();
    RatingAggregator::recompute(&mut tx, t).await.unwrap();

    let delete = tokio::spawn({
        let pool = pool.clone();
        async move { UserRepo::delete(&pool, racer.id).await }
    });
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    tx.commit().await.unwrap();

    assert!(delete.await.unwrap().unwrap());

    let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
        .bind(t)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(left, 0);
    assert_eq!(rating(&pool, t).await, None);

    let late = ReviewRepo::create(
        &pool,
        t,
        racer.id,
        &CreateReview {
            text: "too late".into(),
            score: 3,
        },
    )
    .await;
    assert!(late.is_err());
    assert_eq!(rating(&pool, t).await, None);
}

// ---------------------------------------------------------------------------
// Constraints and cascades
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn one_review_per_author_and_title(pool: PgPool) {
    let t = title(&pool, "Memento").await;
    let a = user(&pool, "a").await;
    review(&pool, t, a.id, 5).await;

    let err = ReviewRepo::create(
        &pool,
        t,
        a.id,
        &CreateReview {
            text: "again".into(),
            score: 9,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(constraint_of(&err).as_deref(), Some("uq_reviews_author_title"));
    assert_eq!(rating(&pool, t).await, Some(5), "failed insert must roll back");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn score_check_constraint_backs_validation(pool: PgPool) {
    let t = title(&pool, "Up").await;
    let a = user(&pool, "a").await;

    let err = ReviewRepo::create(
        &pool,
        t,
        a.id,
        &CreateReview {
            text: "too good".into(),
            score: 11,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(constraint_of(&err).as_deref(), Some("ck_reviews_score"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_username_and_email_are_rejected(pool: PgPool) {
    user(&pool, "dup").await;

    let err = UserRepo::create(&pool, &CreateUser::signup("dup", "fresh@example.com"))
        .await
        .unwrap_err();
    assert_eq!(constraint_of(&err).as_deref(), Some("uq_users_username"));

    let err = UserRepo::create(&pool, &CreateUser::signup("fresh", "dup@example.com"))
        .await
        .unwrap_err();
    assert_eq!(constraint_of(&err).as_deref(), Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_title_cascades_to_reviews_and_comments(pool: PgPool) {
    let t = title(&pool, "Gone").await;
    let a = user(&pool, "a").await;
    let r = review(&pool, t, a.id, 8).await;
    let c = CommentRepo::create(&pool, r, a.id, "nice").await.unwrap();

    assert!(TitleRepo::delete(&pool, t).await.unwrap());

    assert!(ReviewRepo::find_response(&pool, r).await.unwrap().is_none());
    assert!(CommentRepo::find_response(&pool, c.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn genre_links_and_filters(pool: PgPool) {
    let drama = VocabularyRepo::create(
        &pool,
        Vocabulary::Genres,
        &CreateVocabularyEntry {
            name: "Drama".into(),
            slug: "drama".into(),
        },
    )
    .await
    .unwrap();
    let films = VocabularyRepo::create(
        &pool,
        Vocabulary::Categories,
        &CreateVocabularyEntry {
            name: "Films".into(),
            slug: "films".into(),
        },
    )
    .await
    .unwrap();

    let t = TitleRepo::create(
        &pool,
        &CreateTitle {
            name: "Ikiru".into(),
            year: 1952,
            description: None,
            category_id: Some(films.id),
            genre_ids: vec![drama.id, drama.id],
        },
    )
    .await
    .unwrap();
    title(&pool, "Unrelated").await;

    let filter = TitleFilter {
        genre: Some("drama".into()),
        ..Default::default()
    };
    let found = TitleRepo::list(&pool, &filter, 10, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, t.id);
    assert_eq!(found[0].genre.len(), 1);
    assert_eq!(TitleRepo::count(&pool, &filter).await.unwrap(), 1);

    assert!(VocabularyRepo::delete_by_slug(&pool, Vocabulary::Genres, "drama").await.unwrap());
    let response = TitleRepo::find_response(&pool, t.id).await.unwrap().unwrap();
    assert!(response.genre.is_empty());
    assert_eq!(response.category.map(|c| c.slug).as_deref(), Some("films"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_stored_role_reads_as_user(pool: PgPool) {
    let u = user(&pool, "legacy").await;
    // Bypass the check constraint the way a legacy row would have.
    sqlx::query("ALTER TABLE users DROP CONSTRAINT ck_users_role")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE users SET role = 'superuser' WHERE id = $1")
        .bind(u.id)
        .execute(&pool)
        .await
        .unwrap();

    let stored = UserRepo::find_by_id(&pool, u.id).await.unwrap().unwrap();
    assert_eq!(stored.role(), Role::User);
}

// ---------------------------------------------------------------------------
// Confirmation codes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn confirmation_code_is_consumed_once(pool: PgPool) {
    let u = user(&pool, "coder").await;
    let expires = Utc::now() + Duration::minutes(15);
    UserRepo::set_confirmation_code(&pool, u.id, "hash-1", expires)
        .await
        .unwrap();

    assert!(!UserRepo::consume_confirmation_code(&pool, u.id, "hash-other").await.unwrap());
    assert!(UserRepo::consume_confirmation_code(&pool, u.id, "hash-1").await.unwrap());
    assert!(!UserRepo::consume_confirmation_code(&pool, u.id, "hash-1").await.unwrap());

    let stored = UserRepo::find_by_id(&pool, u.id).await.unwrap().unwrap();
    assert_matches!(stored.confirmation_code_hash, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_confirmation_code_cannot_be_consumed(pool: PgPool) {
    let u = user(&pool, "late").await;
    UserRepo::set_confirmation_code(&pool, u.id, "hash-1", Utc::now() - Duration::seconds(1))
        .await
        .unwrap();

    assert!(!UserRepo::consume_confirmation_code(&pool, u.id, "hash-1").await.unwrap());
}
