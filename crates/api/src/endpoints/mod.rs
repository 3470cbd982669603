//! API endpoints.

mod comments;
mod likes;
mod posts;

use axum::Router;
use serde::Deserialize;

use crate::middleware::AppState;

/// Default page size for list endpoints.
const DEFAULT_LIMIT: u64 = 20;

/// Largest page size a client may ask for.
const MAX_LIMIT: u64 = 100;

/// `limit`/`offset` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ListQuery {
    /// Requested page size, clamped to `1..=100`.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/posts",
        posts::router()
            .merge(comments::router())
            .merge(likes::router()),
    )
}
