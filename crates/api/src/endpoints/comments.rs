//! Comment endpoints.

use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use socialnet_common::AppResult;
use socialnet_core::{CommentResponse, CreateCommentInput, UpdateCommentInput};

use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// List the comments of a post.
async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.comment_service.list(&post_id).await?;
    Ok(ApiResponse::ok(comments))
}

/// Comment on a post.
async fn create_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(input): ApiJson<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .create(Some(&user.id), &post_id, input)
        .await?;
    Ok(ApiResponse::created(comment))
}

async fn get_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state.comment_service.get(&post_id, &comment_id).await?;
    Ok(ApiResponse::ok(comment))
}

async fn update_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(String, String)>,
    ApiJson(input): ApiJson<UpdateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .update(Some(&user.id), &post_id, &comment_id, input)
        .await?;
    Ok(ApiResponse::ok(comment))
}

async fn delete_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    state
        .comment_service
        .delete(Some(&user.id), &post_id, &comment_id)
        .await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{post_id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/{post_id}/comments/{comment_id}",
            get(get_comment)
                .put(update_comment)
                .patch(update_comment)
                .delete(delete_comment),
        )
}
