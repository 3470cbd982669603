//! Comment service for managing comments under a post.

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use socialnet_common::{AppError, AppResult, IdGenerator};
use socialnet_db::entities::comment;
use socialnet_db::repositories::{CommentRepository, PostRepository};
use tracing::info;
use validator::Validate;

use crate::policy::{authorize_mutation, require_actor};

/// Input for creating or replacing a comment.
///
/// Only `text` is read; `post` and `user` are always taken from the request
/// path and the authenticated actor, so payload values for them are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 10000))]
    pub text: String,
}

/// Input for updating a comment.
pub type UpdateCommentInput = CreateCommentInput;

/// Response for a comment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post: String,
    pub user: String,
    pub text: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            post: c.post_id,
            user: c.user_id,
            text: c.text,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// Service for managing comments.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List the comments of a post, oldest first.
    pub async fn list(&self, post_id: &str) -> AppResult<Vec<CommentResponse>> {
        self.post_repo.get_by_id(post_id).await?;
        let comments = self.comment_repo.find_by_post(post_id).await?;
        Ok(comments.into_iter().map(Into::into).collect())
    }

    /// Get a single comment of a post.
    pub async fn get(&self, post_id: &str, comment_id: &str) -> AppResult<CommentResponse> {
        let comment = self.comment_repo.get_in_post(post_id, comment_id).await?;
        Ok(comment.into())
    }

    /// Comment on a post.
    pub async fn create(
        &self,
        actor: Option<&str>,
        post_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<CommentResponse> {
        let user_id = require_actor(actor)?;
        let text = validated_text(&input)?;

        let post = self.post_repo.get_by_id(post_id).await?;

        let now = Utc::now();
        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id),
            user_id: Set(user_id.to_string()),
            text: Set(text),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let comment = self.comment_repo.create(model).await?;
        info!(
            comment_id = %comment.id,
            post_id = %comment.post_id,
            user_id = %user_id,
            "Comment created"
        );

        Ok(comment.into())
    }

    /// Replace the text of a comment. Author only.
    pub async fn update(
        &self,
        actor: Option<&str>,
        post_id: &str,
        comment_id: &str,
        input: UpdateCommentInput,
    ) -> AppResult<CommentResponse> {
        require_actor(actor)?;
        let comment = self.comment_repo.get_in_post(post_id, comment_id).await?;
        authorize_mutation(actor, &comment, "You can only edit your own comments")?;

        let text = validated_text(&input)?;

        let mut active: comment::ActiveModel = comment.into();
        active.text = Set(text);
        active.updated_at = Set(Utc::now().into());

        let updated = self.comment_repo.update(active).await?;
        Ok(updated.into())
    }

    /// Delete a comment. Author only.
    pub async fn delete(
        &self,
        actor: Option<&str>,
        post_id: &str,
        comment_id: &str,
    ) -> AppResult<()> {
        require_actor(actor)?;
        let comment = self.comment_repo.get_in_post(post_id, comment_id).await?;
        authorize_mutation(actor, &comment, "You can only delete your own comments")?;

        let id = comment.id.clone();
        self.comment_repo.delete(comment).await?;
        info!(comment_id = %id, post_id = %post_id, "Comment deleted");

        Ok(())
    }
}

/// Validate comment text; whitespace-only text counts as empty.
fn validated_text(input: &CreateCommentInput) -> AppResult<String> {
    input.validate()?;
    if input.text.trim().is_empty() {
        return Err(AppError::Validation("Comment text must not be empty".to_string()));
    }
    Ok(input.text.clone())
}
