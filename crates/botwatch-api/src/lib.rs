pub mod error;
pub mod messages;
pub mod pagination;
pub mod stats;
pub mod users;

use std::path::Path;
use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;

use botwatch_db::Database;

use crate::error::ApiError;

/// Largest accepted request body.
pub const BODY_LIMIT: usize = 1024 * 1024;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

impl AppStateInner {
    pub fn new(db: Database) -> AppState {
        Arc::new(Self { db })
    }
}

/// Builds the full application: JSON API under `/api`, static dashboard
/// assets from `public_dir` for everything else.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    let api = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route("/stats", get(stats::get_stats))
        .route("/health", get(stats::health))
        .fallback(error::api_not_found)
        .method_not_allowed_fallback(error::api_not_found)
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CatchPanicLayer::custom(error::panic_response))
}

/// Runs a blocking store call off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let result = tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?;
    Ok(result?)
}
