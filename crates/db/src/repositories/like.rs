//! Post like repository.

use std::collections::HashMap;
use std::sync::Arc;

use super::{PostCount, counts_by_post};
use crate::entities::{PostLike, post_like};
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
    sea_query::{Expr, OnConflict},
};
use socialnet_common::{AppError, AppResult};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a like unless the `(user_id, post_id)` pair already exists.
    ///
    /// Runs as a single `INSERT ... ON CONFLICT DO NOTHING`, so concurrent
    /// callers for the same pair store exactly one row. Returns `true` when
    /// this call inserted the row.
    ///
    /// A post removed before the insert lands fails the foreign key and is
    /// reported as [`AppError::PostNotFound`].
    pub async fn insert_if_absent(&self, model: post_like::ActiveModel) -> AppResult<bool> {
        let post_id = match &model.post_id {
            ActiveValue::Set(id) | ActiveValue::Unchanged(id) => id.clone(),
            ActiveValue::NotSet => String::new(),
        };

        let inserted = PostLike::insert(model)
            .on_conflict(
                OnConflict::columns([post_like::Column::UserId, post_like::Column::PostId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| insert_error(e, &post_id))?;

        Ok(inserted > 0)
    }

    /// Delete the like a user left on a post. Returns the number of rows removed.
    pub async fn delete_by_user_and_post(&self, user_id: &str, post_id: &str) -> AppResult<u64> {
        let deleted = PostLike::delete_many()
            .filter(post_like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(deleted.rows_affected)
    }

    /// All likes on a post, newest first.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<post_like::Model>> {
        PostLike::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .order_by_desc(post_like::Column::CreatedAt)
            .order_by_desc(post_like::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count likes on a post.
    pub async fn count_by_post(&self, post_id: &str) -> AppResult<u64> {
        PostLike::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count likes for several posts in one grouped query.
    ///
    /// Posts without likes are absent from the map.
    pub async fn count_by_posts(&self, post_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = PostLike::find()
            .select_only()
            .column(post_like::Column::PostId)
            .column_as(Expr::col(post_like::Column::Id).count(), "count")
            .filter(post_like::Column::PostId.is_in(post_ids.to_vec()))
            .group_by(post_like::Column::PostId)
            .into_model::<PostCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(counts_by_post(rows))
    }
}

fn insert_error(err: DbErr, post_id: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::PostNotFound(post_id.to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}
