//! Like service.
//!
//! A user either likes a post or does not. Liking twice is not an error: the
//! second call reports [`LikeOutcome::AlreadyLiked`] and stores nothing.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use socialnet_common::{AppError, AppResult, IdGenerator};
use socialnet_db::entities::{post_like, user};
use socialnet_db::repositories::{LikeRepository, PostRepository, UserRepository};
use tracing::info;

use crate::policy::require_actor;

/// Result of a like request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    /// A new like was stored.
    Liked,
    /// The user had already liked the post; nothing changed.
    AlreadyLiked,
}

impl LikeOutcome {
    /// Status string reported to clients.
    #[must_use]
    pub const fn status(self) -> &'static str {
        match self {
            Self::Liked => "liked",
            Self::AlreadyLiked => "already liked",
        }
    }
}

/// Result of an unlike request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlikeOutcome {
    Unliked,
}

/// Public profile of the user behind a like.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LikeUser {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
}

impl From<user::Model> for LikeUser {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
        }
    }
}

/// Response for a like.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub id: String,
    pub user: LikeUser,
    pub post: String,
    pub created_at: String,
}

/// Service for liking posts.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    post_repo: PostRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(
        like_repo: LikeRepository,
        post_repo: PostRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            like_repo,
            post_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a post.
    pub async fn like(&self, actor: Option<&str>, post_id: &str) -> AppResult<LikeOutcome> {
        let user_id = require_actor(actor)?;
        let post = self.post_repo.get_by_id(post_id).await?;

        let model = post_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            post_id: Set(post.id),
            created_at: Set(Utc::now().into()),
        };

        let outcome = if self.like_repo.insert_if_absent(model).await? {
            LikeOutcome::Liked
        } else {
            LikeOutcome::AlreadyLiked
        };

        info!(post_id = %post_id, user_id = %user_id, status = outcome.status(), "Like");
        Ok(outcome)
    }

    /// Remove the actor's like from a post.
    pub async fn unlike(&self, actor: Option<&str>, post_id: &str) -> AppResult<UnlikeOutcome> {
        let user_id = require_actor(actor)?;

        let removed = self
            .like_repo
            .delete_by_user_and_post(user_id, post_id)
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound("Like not found".to_string()));
        }

        info!(post_id = %post_id, user_id = %user_id, "Unlike");
        Ok(UnlikeOutcome::Unliked)
    }

    /// List the likes of a post, newest first.
    pub async fn list(&self, viewer: Option<&str>, post_id: &str) -> AppResult<Vec<LikeResponse>> {
        require_actor(viewer)?;
        self.post_repo.get_by_id(post_id).await?;

        let likes = self.like_repo.find_by_post(post_id).await?;
        let user_ids: Vec<String> = likes.iter().map(|l| l.user_id.clone()).collect();
        let users: HashMap<String, LikeUser> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u.into()))
            .collect();

        Ok(likes
            .into_iter()
            .filter_map(|l| {
                let user = users.get(&l.user_id).cloned()?;
                Some(LikeResponse {
                    id: l.id,
                    user,
                    post: l.post_id,
                    created_at: l.created_at.to_rfc3339(),
                })
            })
            .collect())
    }
}
