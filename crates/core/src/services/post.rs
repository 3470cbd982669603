//! Post service for managing image posts.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use socialnet_common::{AppError, AppResult, IdGenerator, StorageBackend};
use socialnet_db::entities::{comment, post};
use socialnet_db::repositories::{CommentRepository, LikeRepository, PostRepository};
use tracing::{info, warn};

use super::comment::CommentResponse;
use crate::policy::{authorize_mutation, require_actor};

/// Maximum title length in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Input for creating a post.
///
/// `image` is the storage key of an already uploaded image.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Input for updating a post. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub image: Option<String>,
}

/// Response for a post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: String,
    pub image_url: String,
    pub likes_count: u64,
    pub comments_count: u64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentResponse>>,
}

impl PostResponse {
    /// List projection: counts only.
    #[must_use]
    pub fn summary(
        p: post::Model,
        image_url: String,
        likes_count: u64,
        comments_count: u64,
    ) -> Self {
        Self {
            id: p.id,
            user: p.user_id,
            title: p.title,
            description: p.description,
            image: p.image,
            image_url,
            likes_count,
            comments_count,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
            comments: None,
        }
    }

    /// Detail projection: counts plus the full comment thread.
    #[must_use]
    pub fn detail(
        p: post::Model,
        image_url: String,
        likes_count: u64,
        comments: Vec<comment::Model>,
    ) -> Self {
        let comments: Vec<CommentResponse> = comments.into_iter().map(Into::into).collect();
        let mut response = Self::summary(p, image_url, likes_count, comments.len() as u64);
        response.comments = Some(comments);
        response
    }
}

/// Service for managing posts.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    comment_repo: CommentRepository,
    like_repo: LikeRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        comment_repo: CommentRepository,
        like_repo: LikeRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            like_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new post owned by `actor`.
    pub async fn create(
        &self,
        actor: Option<&str>,
        input: CreatePostInput,
    ) -> AppResult<PostResponse> {
        let user_id = require_actor(actor)?;
        if let Some(ref title) = input.title {
            validate_title(title)?;
        }

        let image = match input.image {
            Some(image) if !image.trim().is_empty() => image,
            _ => {
                return Err(AppError::Validation(
                    "Image must not be empty".to_string(),
                ));
            }
        };

        let now = Utc::now();
        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(normalize(input.title)),
            image: Set(image),
            description: Set(normalize(input.description)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let post = self.post_repo.create(model).await?;
        info!(post_id = %post.id, user_id = %user_id, "Post created");

        let image_url = self.storage.public_url(&post.image);
        Ok(PostResponse::summary(post, image_url, 0, 0))
    }

    /// Partially update a post. Owner only.
    pub async fn update(
        &self,
        actor: Option<&str>,
        post_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<PostResponse> {
        require_actor(actor)?;
        let post = self.post_repo.get_by_id(post_id).await?;
        authorize_mutation(actor, &post, "You can only update your own posts")?;

        let old_image = post.image.clone();
        let mut active: post::ActiveModel = post.into();

        if let Some(title) = input.title {
            if let Some(ref t) = title {
                validate_title(t)?;
            }
            active.title = Set(normalize(title));
        }

        if let Some(description) = input.description {
            active.description = Set(normalize(description));
        }

        let mut replaced_image = None;
        if let Some(image) = input.image {
            if image.trim().is_empty() {
                return Err(AppError::Validation(
                    "Image must not be empty".to_string(),
                ));
            }
            if image != old_image {
                replaced_image = Some(old_image);
            }
            active.image = Set(image);
        }

        active.updated_at = Set(Utc::now().into());

        // Nothing fallible may run after the update commits: callers discard
        // the new upload on error.
        let likes_count = self.like_repo.count_by_post(post_id).await?;
        let comments_count = self.comment_repo.count_by_post(post_id).await?;

        let updated = self.post_repo.update(active).await?;
        info!(post_id = %updated.id, "Post updated");

        if let Some(key) = replaced_image {
            self.remove_blob(&key).await;
        }

        let image_url = self.storage.public_url(&updated.image);

        Ok(PostResponse::summary(
            updated,
            image_url,
            likes_count,
            comments_count,
        ))
    }

    /// Delete a post with its comments and likes. Owner only.
    pub async fn delete(&self, actor: Option<&str>, post_id: &str) -> AppResult<()> {
        require_actor(actor)?;
        let post = self.post_repo.get_by_id(post_id).await?;
        authorize_mutation(actor, &post, "You can only delete your own posts")?;

        let removed = self.post_repo.delete_with_dependents(&post.id).await?;
        if removed == 0 {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }
        info!(post_id = %post.id, user_id = %post.user_id, "Post deleted");

        self.remove_blob(&post.image).await;
        Ok(())
    }

    /// Get a post with its comments.
    pub async fn get(&self, post_id: &str) -> AppResult<PostResponse> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let comments = self.comment_repo.find_by_post(&post.id).await?;
        let likes_count = self.like_repo.count_by_post(&post.id).await?;
        let image_url = self.storage.public_url(&post.image);

        Ok(PostResponse::detail(post, image_url, likes_count, comments))
    }

    /// List posts, newest first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<PostResponse>> {
        let posts = self.post_repo.find_with_pagination(limit, offset).await?;
        let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();

        let likes = self.like_repo.count_by_posts(&ids).await?;
        let comments = self.comment_repo.count_by_posts(&ids).await?;

        Ok(posts
            .into_iter()
            .map(|p| {
                let likes_count = likes.get(&p.id).copied().unwrap_or(0);
                let comments_count = comments.get(&p.id).copied().unwrap_or(0);
                let image_url = self.storage.public_url(&p.image);
                PostResponse::summary(p, image_url, likes_count, comments_count)
            })
            .collect())
    }

    /// Best-effort removal of an image that no post references any more.
    async fn remove_blob(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            warn!(key = %key, error = %e, "Failed to remove post image");
        }
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::Validation(format!(
            "Title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Blank optional text is stored as NULL.
fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use socialnet_common::LocalStorage;

    struct Dbs {
        post: Arc<DatabaseConnection>,
        comment: Arc<DatabaseConnection>,
        like: Arc<DatabaseConnection>,
    }

    impl Dbs {
        fn empty() -> Self {
            Self {
                post: empty_db(),
                comment: empty_db(),
                like: empty_db(),
            }
        }

        fn service(&self) -> PostService {
            let storage = LocalStorage::new(
                std::env::temp_dir().join("socialnet-post-tests"),
                "/files".to_string(),
            );
            PostService::new(
                PostRepository::new(self.post.clone()),
                CommentRepository::new(self.comment.clone()),
                LikeRepository::new(self.like.clone()),
                Arc::new(storage),
            )
        }
    }

    fn empty_db() -> Arc<DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn count_db(n: i64) -> Arc<DatabaseConnection> {
        Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(n))
                }]])
                .into_connection(),
        )
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn test_post(id: &str, user_id: &str) -> post::Model {
        let now = Utc::now();
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: Some("Sunset".to_string()),
            image: "images/x.png".to_string(),
            description: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn test_comment(id: &str, post_id: &str) -> comment::Model {
        let now = Utc::now();
        comment::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            user_id: "bob".to_string(),
            text: "Nice".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn test_create_requires_image() {
        let svc = Dbs::empty().service();

        let result = svc.create(Some("alice"), CreatePostInput::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let input = CreatePostInput {
            image: Some(String::new()),
            ..Default::default()
        };
        let result = svc.create(Some("alice"), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_long_title() {
        let svc = Dbs::empty().service();
        let input = CreatePostInput {
            title: Some("x".repeat(MAX_TITLE_LENGTH + 1)),
            image: Some("images/x.png".to_string()),
            ..Default::default()
        };

        let result = svc.create(Some("alice"), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_requires_actor() {
        let svc = Dbs::empty().service();
        let input = CreatePostInput {
            image: Some("images/x.png".to_string()),
            ..Default::default()
        };

        let result = svc.create(None, input).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_create() {
        let dbs = Dbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[test_post("post1", "alice")]])
                    .into_connection(),
            ),
            ..Dbs::empty()
        };

        let input = CreatePostInput {
            title: Some("Sunset".to_string()),
            image: Some("images/x.png".to_string()),
            ..Default::default()
        };
        let created = dbs.service().create(Some("alice"), input).await.unwrap();

        assert_eq!(created.user, "alice");
        assert_eq!(created.image_url, "/files/images/x.png");
        assert_eq!(created.likes_count, 0);
        assert!(created.comments.is_none());
    }

    #[tokio::test]
    async fn test_ownership_scenario() {
        let post = test_post("post1", "alice");

        // B tries to delete A's post.
        let dbs = Dbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[post.clone()]])
                    .into_connection(),
            ),
            ..Dbs::empty()
        };
        let result = dbs.service().delete(Some("bob"), "post1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        // A deletes it.
        let dbs = Dbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[post]])
                    .append_exec_results([exec(0), exec(0), exec(1)])
                    .into_connection(),
            ),
            ..Dbs::empty()
        };
        assert!(dbs.service().delete(Some("alice"), "post1").await.is_ok());

        // Then it is gone.
        let dbs = Dbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([Vec::<post::Model>::new()])
                    .into_connection(),
            ),
            ..Dbs::empty()
        };
        let result = dbs.service().get("post1").await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_anonymous() {
        let svc = Dbs::empty().service();
        let result = svc.delete(None, "post1").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let dbs = Dbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([Vec::<post::Model>::new()])
                    .into_connection(),
            ),
            ..Dbs::empty()
        };

        let result = dbs.service().delete(Some("alice"), "missing").await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_by_non_owner_forbidden() {
        let dbs = Dbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[test_post("post1", "alice")]])
                    .into_connection(),
            ),
            ..Dbs::empty()
        };

        let input = UpdatePostInput {
            title: Some(Some("Mine now".to_string())),
            ..Default::default()
        };
        let result = dbs.service().update(Some("bob"), "post1", input).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_empty_image() {
        let dbs = Dbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[test_post("post1", "alice")]])
                    .into_connection(),
            ),
            ..Dbs::empty()
        };

        let input = UpdatePostInput {
            image: Some(" ".to_string()),
            ..Default::default()
        };
        let result = dbs.service().update(Some("alice"), "post1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_partial() {
        let original = test_post("post1", "alice");
        let mut edited = original.clone();
        edited.description = Some("Golden hour".to_string());

        let dbs = Dbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[original]])
                    .append_query_results([[edited]])
                    .into_connection(),
            ),
            comment: count_db(2),
            like: count_db(5),
        };

        let input = UpdatePostInput {
            description: Some(Some("Golden hour".to_string())),
            ..Default::default()
        };
        let updated = dbs.service().update(Some("alice"), "post1", input).await.unwrap();

        assert_eq!(updated.title.as_deref(), Some("Sunset"));
        assert_eq!(updated.description.as_deref(), Some("Golden hour"));
        assert_eq!(updated.likes_count, 5);
        assert_eq!(updated.comments_count, 2);
    }

    #[tokio::test]
    async fn test_update_count_failure_keeps_old_image() {
        let dir = std::env::temp_dir()
            .join(format!("socialnet-post-{}", IdGenerator::new().generate()));
        let storage = LocalStorage::new(dir.clone(), "/files".to_string());
        storage.upload("images/old.png", b"old", "image/png").await.unwrap();

        let mut original = test_post("post1", "alice");
        original.image = "images/old.png".to_string();
        let post_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[original]])
                .into_connection(),
        );

        // Count queries have no mocked rows, so they fail.
        let svc = PostService::new(
            PostRepository::new(post_db.clone()),
            CommentRepository::new(empty_db()),
            LikeRepository::new(empty_db()),
            Arc::new(storage),
        );
        let input = UpdatePostInput {
            image: Some("images/new.png".to_string()),
            ..Default::default()
        };
        let result = svc.update(Some("alice"), "post1", input).await;
        assert!(matches!(result, Err(AppError::Database(_))));
        drop(svc);

        assert!(tokio::fs::try_exists(dir.join("images/old.png")).await.unwrap());
        let log = Arc::try_unwrap(post_db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 1);
        assert!(!format!("{log:?}").contains("UPDATE"));

        tokio::fs::remove_dir_all(dir).await.ok();
    }

    #[tokio::test]
    async fn test_update_rejects_long_title() {
        let dbs = Dbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[test_post("post1", "alice")]])
                    .into_connection(),
            ),
            ..Dbs::empty()
        };

        let input = UpdatePostInput {
            title: Some(Some("x".repeat(MAX_TITLE_LENGTH + 1))),
            ..Default::default()
        };
        let result = dbs.service().update(Some("alice"), "post1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_title_boundary() {
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(validate_title(&"é".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[tokio::test]
    async fn test_get_detail_includes_comments() {
        let dbs = Dbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[test_post("post1", "alice")]])
                    .into_connection(),
            ),
            comment: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[test_comment("c1", "post1"), test_comment("c2", "post1")]])
                    .into_connection(),
            ),
            like: count_db(1),
        };

        let detail = dbs.service().get("post1").await.unwrap();

        assert_eq!(detail.comments_count, 2);
        assert_eq!(detail.likes_count, 1);
        assert_eq!(detail.comments.unwrap()[0].id, "c1");
    }

    #[tokio::test]
    async fn test_list_fills_counts() {
        let dbs = Dbs {
            post: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[test_post("post2", "alice"), test_post("post1", "bob")]])
                    .into_connection(),
            ),
            comment: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[maplit::btreemap! {
                        "post_id" => sea_orm::Value::from("post1"),
                        "count" => sea_orm::Value::BigInt(Some(3)),
                    }]])
                    .into_connection(),
            ),
            like: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[maplit::btreemap! {
                        "post_id" => sea_orm::Value::from("post2"),
                        "count" => sea_orm::Value::BigInt(Some(7)),
                    }]])
                    .into_connection(),
            ),
        };

        let posts = dbs.service().list(20, 0).await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "post2");
        assert_eq!(posts[0].likes_count, 7);
        assert_eq!(posts[0].comments_count, 0);
        assert_eq!(posts[1].comments_count, 3);
        assert!(posts[1].comments.is_none());
    }

    #[test]
    fn test_normalize_blank() {
        assert_eq!(normalize(Some("  ".to_string())), None);
        assert_eq!(normalize(Some("a".to_string())), Some("a".to_string()));
    }
}
