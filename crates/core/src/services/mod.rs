//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod like;
pub mod post;
pub mod user;

pub use comment::{CommentResponse, CommentService, CreateCommentInput, UpdateCommentInput};
pub use like::{LikeOutcome, LikeResponse, LikeService, LikeUser, UnlikeOutcome};
pub use post::{CreatePostInput, MAX_TITLE_LENGTH, PostResponse, PostService, UpdatePostInput};
pub use user::UserService;
