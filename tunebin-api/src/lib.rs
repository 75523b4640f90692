//! tunebin-api library - song catalog HTTP service
//!
//! Clients upload audio with a title and artist, list active songs, move
//! songs to a recycle bin, restore them, or purge them for good. Uploaded
//! files are served back under `/uploads`.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tunebin_common::CatalogStore;

pub mod api;
pub mod error;
pub mod files;
pub mod genre;

pub use crate::error::{ApiError, ApiResult};
use crate::files::FileStore;
use crate::genre::GenreClassifier;

/// Room for multipart framing and the text fields on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Song catalog
    pub store: CatalogStore,
    /// Uploaded audio files
    pub files: Arc<FileStore>,
    /// Genre assignment for new uploads
    pub classifier: Arc<dyn GenreClassifier>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: CatalogStore, files: FileStore, classifier: Arc<dyn GenreClassifier>) -> Self {
        Self {
            store,
            files: Arc::new(files),
            classifier,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post};

    let body_limit = usize::try_from(state.files.max_file_size())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let uploads = ServeDir::new(state.files.dir());

    Router::new()
        .route("/api/songs", get(api::list_songs).post(api::upload_song))
        .route("/api/songs/:id", delete(api::soft_delete_song))
        .route("/api/recycle-bin", get(api::list_recycle_bin))
        .route("/api/recycle-bin/:id/restore", post(api::restore_song))
        .route("/api/recycle-bin/:id", delete(api::purge_song))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .nest_service("/uploads", uploads)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
