//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `socialnet_test`)
//!   `TEST_DB_PASSWORD` (default: `socialnet_test`)
//!   `TEST_DB_NAME` (default: `socialnet_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Utc;
use sea_orm::Set;
use socialnet_common::{AppError, IdGenerator};
use socialnet_db::entities::{comment, post, post_like};
use socialnet_db::repositories::{CommentRepository, LikeRepository, PostRepository};
use socialnet_db::test_utils::{TestDatabase, TestDbConfig};

async fn seed_post(repo: &PostRepository, owner: &str) -> post::Model {
    let now = Utc::now();
    repo.create(post::ActiveModel {
        id: Set(IdGenerator::new().generate()),
        user_id: Set(owner.to_string()),
        title: Set(None),
        image: Set("images/x.png".to_string()),
        description: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    })
    .await
    .unwrap()
}

fn like_model(user_id: &str, post_id: &str) -> post_like::ActiveModel {
    post_like::ActiveModel {
        id: Set(IdGenerator::new().generate()),
        user_id: Set(user_id.to_string()),
        post_id: Set(post_id.to_string()),
        created_at: Set(Utc::now().into()),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_likes_store_one_row() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    let owner = db.create_user("owner").await.unwrap();
    let fan = db.create_user("fan").await.unwrap();

    let conn = db.shared();
    let posts = PostRepository::new(conn.clone());
    let likes = LikeRepository::new(conn);
    let post = seed_post(&posts, &owner.id).await;

    let attempts = (0..8).map(|_| {
        let likes = likes.clone();
        let user_id = fan.id.clone();
        let post_id = post.id.clone();
        tokio::spawn(async move { likes.insert_if_absent(like_model(&user_id, &post_id)).await })
    });

    let mut inserted = 0;
    for handle in attempts {
        if handle.await.unwrap().unwrap() {
            inserted += 1;
        }
    }

    assert_eq!(inserted, 1);
    assert_eq!(likes.count_by_post(&post.id).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_like_on_removed_post_is_not_found() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    let fan = db.create_user("fan").await.unwrap();

    let likes = LikeRepository::new(db.shared());
    let result = likes.insert_if_absent(like_model(&fan.id, "gone")).await;

    assert!(matches!(result, Err(AppError::PostNotFound(id)) if id == "gone"));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_post_delete_cascades() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    let owner = db.create_user("owner").await.unwrap();
    let fan = db.create_user("fan").await.unwrap();

    let conn = db.shared();
    let posts = PostRepository::new(conn.clone());
    let comments = CommentRepository::new(conn.clone());
    let likes = LikeRepository::new(conn);
    let post = seed_post(&posts, &owner.id).await;

    likes
        .insert_if_absent(like_model(&fan.id, &post.id))
        .await
        .unwrap();
    let now = Utc::now();
    comments
        .create(comment::ActiveModel {
            id: Set(IdGenerator::new().generate()),
            post_id: Set(post.id.clone()),
            user_id: Set(fan.id.clone()),
            text: Set("first".to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        })
        .await
        .unwrap();

    assert_eq!(posts.delete_with_dependents(&post.id).await.unwrap(), 1);

    assert!(posts.find_by_id(&post.id).await.unwrap().is_none());
    assert_eq!(comments.count_by_post(&post.id).await.unwrap(), 0);
    assert_eq!(likes.count_by_post(&post.id).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_empty_image_rejected_by_schema() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    let owner = db.create_user("owner").await.unwrap();

    let posts = PostRepository::new(db.shared());
    let now = Utc::now();
    let result = posts
        .create(post::ActiveModel {
            id: Set(IdGenerator::new().generate()),
            user_id: Set(owner.id),
            title: Set(None),
            image: Set(String::new()),
            description: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        })
        .await;

    assert!(result.is_err());
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
