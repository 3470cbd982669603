//! Repositories wrapping database access for each entity.

mod comment;
mod like;
mod post;
mod user;

use std::collections::HashMap;

use sea_orm::FromQueryResult;

pub use comment::CommentRepository;
pub use like::LikeRepository;
pub use post::PostRepository;
pub use user::UserRepository;

/// One row of a `GROUP BY post_id` count.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct PostCount {
    /// Post the rows belong to.
    pub post_id: String,
    /// Number of rows for the post.
    pub count: i64,
}

/// Fold grouped counts into a lookup keyed by post ID.
pub(crate) fn counts_by_post(rows: Vec<PostCount>) -> HashMap<String, u64> {
    rows.into_iter()
        .map(|row| (row.post_id, row.count.max(0) as u64))
        .collect()
}
