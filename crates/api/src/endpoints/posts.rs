//! Post endpoints.

use axum::{
    Router,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use socialnet_common::{AppError, AppResult, generate_storage_key};
use socialnet_core::{CreatePostInput, PostResponse, UpdatePostInput};
use tracing::warn;

use super::ListQuery;
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Image part of a post form.
struct ImagePart {
    data: Vec<u8>,
    file_name: String,
    content_type: String,
}

/// Fields of a `multipart/form-data` post submission.
///
/// `None` means the field was not sent; `Some(None)` means it was sent empty.
#[derive(Default)]
struct PostForm {
    title: Option<Option<String>>,
    description: Option<Option<String>>,
    image: Option<ImagePart>,
}

impl PostForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?
                        .to_vec();
                    if !data.is_empty() {
                        form.image = Some(ImagePart {
                            data,
                            file_name,
                            content_type,
                        });
                    }
                }
                "title" | "description" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    let value = Some(text).filter(|t| !t.is_empty());
                    if name == "title" {
                        form.title = Some(value);
                    } else {
                        form.description = Some(value);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

/// Store an uploaded image and return its storage key.
async fn store_image(state: &AppState, user_id: &str, part: ImagePart) -> AppResult<String> {
    if !part.content_type.starts_with("image/") {
        return Err(AppError::Validation(
            "Uploaded file must be an image".to_string(),
        ));
    }
    if part.data.len() > state.max_upload_bytes {
        return Err(AppError::Validation(format!(
            "Image must be at most {} bytes",
            state.max_upload_bytes
        )));
    }

    let key = generate_storage_key(user_id, &part.file_name);
    state
        .storage
        .upload(&key, &part.data, &part.content_type)
        .await
}

/// Remove an upload that never got attached to a post.
async fn discard_image(state: &AppState, key: &str) {
    if let Err(e) = state.storage.delete(key).await {
        warn!(key = %key, error = %e, "Failed to discard upload");
    }
}

/// List posts, newest first.
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let posts = state
        .post_service
        .list(query.limit(), query.offset())
        .await?;
    Ok(ApiResponse::ok(posts))
}

/// Create a post from a multipart form.
async fn create_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<PostResponse>> {
    let form = PostForm::read(multipart).await?;

    let image = match form.image {
        Some(part) => Some(store_image(&state, &user.id, part).await?),
        None => None,
    };

    let input = CreatePostInput {
        title: form.title.flatten(),
        description: form.description.flatten(),
        image: image.clone(),
    };

    match state.post_service.create(Some(&user.id), input).await {
        Ok(post) => Ok(ApiResponse::created(post)),
        Err(e) => {
            if let Some(key) = image {
                discard_image(&state, &key).await;
            }
            Err(e)
        }
    }
}

/// Get a post with its comments.
async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get(&post_id).await?;
    Ok(ApiResponse::ok(post))
}

/// Update a post. Only the fields present in the form change.
async fn update_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    multipart: Multipart,
) -> AppResult<ApiResponse<PostResponse>> {
    let form = PostForm::read(multipart).await?;

    let image = match form.image {
        Some(part) => Some(store_image(&state, &user.id, part).await?),
        None => None,
    };

    let input = UpdatePostInput {
        title: form.title,
        description: form.description,
        image: image.clone(),
    };

    match state.post_service.update(Some(&user.id), &post_id, input).await {
        Ok(post) => Ok(ApiResponse::ok(post)),
        Err(e) => {
            if let Some(key) = image {
                discard_image(&state, &key).await;
            }
            Err(e)
        }
    }
}

/// Delete a post.
async fn delete_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.post_service.delete(Some(&user.id), &post_id).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route(
            "/{post_id}",
            get(get_post)
                .put(update_post)
                .patch(update_post)
                .delete(delete_post),
        )
}
