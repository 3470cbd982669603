//! socialnet server entry point.

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use socialnet_api::{middleware::AppState, router as api_router};
use socialnet_common::{Config, LocalStorage, StorageBackend};
use socialnet_core::{CommentService, LikeService, PostService, UserService};
use socialnet_db::repositories::{
    CommentRepository, LikeRepository, PostRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Slack on top of the image size limit for the other form fields.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "socialnet=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting socialnet server...");

    let config = Config::load()?;

    let db = socialnet_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    socialnet_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    tokio::fs::create_dir_all(&config.storage.base_path).await?;
    let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
        config.storage.base_path.clone(),
        config.storage.base_url.clone(),
    ));

    // Repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));

    // Services
    let state = AppState {
        user_service: UserService::new(user_repo.clone()),
        post_service: PostService::new(
            post_repo.clone(),
            comment_repo.clone(),
            like_repo.clone(),
            Arc::clone(&storage),
        ),
        comment_service: CommentService::new(comment_repo, post_repo.clone()),
        like_service: LikeService::new(like_repo, post_repo, user_repo),
        storage,
        max_upload_bytes: config.storage.max_upload_bytes,
    };

    let files_route = format!("/{}", config.storage.base_url.trim_matches('/'));

    let app = Router::new()
        .nest("/api", api_router())
        .nest_service(&files_route, ServeDir::new(&config.storage.base_path))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            socialnet_api::middleware::auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(
            config.storage.max_upload_bytes + FORM_OVERHEAD_BYTES,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
