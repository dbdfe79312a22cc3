//! Reviews, comments and the title rating against a real database.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_user, delete_auth, get, patch_json_auth, post_json_auth,
    token_for,
};
use serde_json::json;
use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_db::models::title::CreateTitle;
use yamdb_db::repositories::TitleRepo;

async fn create_title(pool: &PgPool, name: &str) -> i64 {
    TitleRepo::create(
        pool,
        &CreateTitle {
            name: name.to_string(),
            year: 1999,
            description: None,
            category_id: None,
            genre_ids: Vec::new(),
        },
    )
    .await
    .expect("title creation should succeed")
    .id
}

async fn post_review(
    pool: &PgPool,
    title_id: i64,
    token: &str,
    score: i32,
) -> (StatusCode, serde_json::Value) {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/titles/{title_id}/reviews"),
        json!({ "text": "Worth watching", "score": score }),
        token,
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn title_rating(pool: &PgPool, title_id: i64) -> serde_json::Value {
    let response = get(build_test_app(pool.clone()), &format!("/api/v1/titles/{title_id}")).await;
    body_json(response).await["data"]["rating"].clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rating_follows_review_mutations(pool: PgPool) {
    let title_id = create_title(&pool, "Matrix").await;
    let a = token_for(&create_user(&pool, "a", Role::User).await);
    let b = token_for(&create_user(&pool, "b", Role::User).await);

    assert_eq!(title_rating(&pool, title_id).await, serde_json::Value::Null);

    let (status, first) = post_review(&pool, title_id, &a, 8).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["data"]["author"], "a");
    assert_eq!(title_rating(&pool, title_id).await, 8);

    // mean 8.5 rounds half away from zero
    let (status, _) = post_review(&pool, title_id, &b, 9).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(title_rating(&pool, title_id).await, 9);

    let review_id = first["data"]["id"].as_i64().unwrap();
    let response = patch_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/titles/{title_id}/reviews/{review_id}"),
        json!({ "score": 1 }),
        &a,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(title_rating(&pool, title_id).await, 5);

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/titles/{title_id}/reviews/{review_id}"),
        &a,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(title_rating(&pool, title_id).await, 9);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_review_by_same_author_conflicts(pool: PgPool) {
    let title_id = create_title(&pool, "Heat").await;
    let token = token_for(&create_user(&pool, "critic", Role::User).await);

    let (status, _) = post_review(&pool, title_id, &token, 7).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = post_review(&pool, title_id, &token, 3).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(title_rating(&pool, title_id).await, 7);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_range_scores_are_rejected(pool: PgPool) {
    let title_id = create_title(&pool, "Ran").await;
    let token = token_for(&create_user(&pool, "scorer", Role::User).await);

    for score in [0, 11, -3] {
        let (status, json) = post_review(&pool, title_id, &token, score).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "score {score}");
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }
    assert_eq!(title_rating(&pool, title_id).await, serde_json::Value::Null);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_author_or_staff_may_edit(pool: PgPool) {
    let title_id = create_title(&pool, "Alien").await;
    let author = token_for(&create_user(&pool, "author", Role::User).await);
    let stranger = token_for(&create_user(&pool, "stranger", Role::User).await);
    let moderator = token_for(&create_user(&pool, "mod", Role::Moderator).await);

    let (_, review) = post_review(&pool, title_id, &author, 6).await;
    let review_id = review["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/titles/{title_id}/reviews/{review_id}");

    let response = patch_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "text": "mine now" }),
        &stranger,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(build_test_app(pool.clone()), &uri, &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "text": "edited by moderation" }),
        &moderator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["text"], "edited by moderation");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_integer_scores_are_rejected(pool: PgPool) {
    let title_id = create_title(&pool, "Ikiru").await;
    let token = token_for(&create_user(&pool, "fractional", Role::User).await);

    for score in [json!(5.5), json!(1e12), json!(1_000_000_000_000i64), json!("9")] {
        let response = post_json_auth(
            build_test_app(pool.clone()),
            &format!("/api/v1/titles/{title_id}/reviews"),
            json!({ "text": "Almost", "score": score }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "score {score}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
    assert_eq!(title_rating(&pool, title_id).await, serde_json::Value::Null);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_comment_author_or_staff_may_edit_comments(pool: PgPool) {
    let title_id = create_title(&pool, "Aliens").await;
    let author = token_for(&create_user(&pool, "author", Role::User).await);
    let stranger = token_for(&create_user(&pool, "stranger", Role::User).await);
    let moderator = token_for(&create_user(&pool, "mod", Role::Moderator).await);

    let (_, review) = post_review(&pool, title_id, &author, 8).await;
    let review_id = review["data"]["id"].as_i64().unwrap();
    let comments = format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments");

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &comments,
        json!({ "text": "Game over, man" }),
        &author,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("{comments}/{comment_id}");

    let response = patch_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "text": "hijacked" }),
        &stranger,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(build_test_app(pool.clone()), &uri, &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "text": "Game over, man. Game over!" }),
        &author,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["text"], "Game over, man. Game over!");
    assert_eq!(json["data"]["author"], "author");

    let response = patch_json_auth(
        build_test_app(pool.clone()),
        &uri,
        json!({ "text": "[removed]" }),
        &moderator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_auth(build_test_app(pool.clone()), &uri, &moderator).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_a_review_removes_its_comments_and_rating_share(pool: PgPool) {
    let title_id = create_title(&pool, "Vertigo").await;
    let first = token_for(&create_user(&pool, "first", Role::User).await);
    let second = token_for(&create_user(&pool, "second", Role::User).await);
    let admin = token_for(&create_user(&pool, "admin", Role::Admin).await);

    let (_, review) = post_review(&pool, title_id, &first, 4).await;
    post_review(&pool, title_id, &second, 10).await;
    assert_eq!(title_rating(&pool, title_id).await, 7);

    let review_id = review["data"]["id"].as_i64().unwrap();
    let comments = format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments");
    for token in [&first, &second] {
        let response = post_json_auth(
            build_test_app(pool.clone()),
            &comments,
            json!({ "text": "Dizzying" }),
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/titles/{title_id}/reviews/{review_id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(title_rating(&pool, title_id).await, 10);

    let response = get(build_test_app(pool.clone()), &comments).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = $1")
        .bind(review_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(left, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn nested_resources_must_match_their_parents(pool: PgPool) {
    let first = create_title(&pool, "First").await;
    let second = create_title(&pool, "Second").await;
    let token = token_for(&create_user(&pool, "nester", Role::User).await);

    let (_, review) = post_review(&pool, first, &token, 5).await;
    let review_id = review["data"]["id"].as_i64().unwrap();

    let response = get(
        build_test_app(pool.clone()),
        &format!("/api/v1/titles/{second}/reviews/{review_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/titles/{first}/reviews/{review_id}/comments"),
        json!({ "text": "Agreed" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let comment_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get(
        build_test_app(pool.clone()),
        &format!("/api/v1/titles/{second}/reviews/{review_id}/comments/{comment_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(
        build_test_app(pool.clone()),
        &format!("/api/v1/titles/{first}/reviews/{review_id}/comments"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["author"], "nester");
}
