//! HTTP API layer for socialnet.
//!
//! - **Endpoints**: posts, comments and likes under `/posts`
//! - **Extractors**: authenticated and optional identities
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
