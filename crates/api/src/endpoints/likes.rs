//! Like endpoints.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use socialnet_common::AppResult;
use socialnet_core::{LikeOutcome, LikeResponse};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Body of a like response.
#[derive(Debug, Serialize)]
pub struct LikeStatus {
    pub status: &'static str,
}

/// List the likes of a post.
async fn list_likes(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<Vec<LikeResponse>>> {
    let likes = state.like_service.list(Some(&user.id), &post_id).await?;
    Ok(ApiResponse::ok(likes))
}

/// Like a post. A repeated like answers 200 instead of 201.
async fn like_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<LikeStatus>> {
    let outcome = state.like_service.like(Some(&user.id), &post_id).await?;
    let status = match outcome {
        LikeOutcome::Liked => StatusCode::CREATED,
        LikeOutcome::AlreadyLiked => StatusCode::OK,
    };
    Ok(ApiResponse::with_status(
        status,
        LikeStatus {
            status: outcome.status(),
        },
    ))
}

/// Remove the caller's like.
async fn unlike_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.like_service.unlike(Some(&user.id), &post_id).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{post_id}/likes",
        get(list_likes).post(like_post).delete(unlike_post),
    )
}
