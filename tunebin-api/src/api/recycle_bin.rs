//! Recycle bin routes: listing, restore, and permanent deletion

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{error, info, warn};
use tunebin_common::Song;

use super::{parse_song_id, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/recycle-bin
pub async fn list_recycle_bin(State(state): State<AppState>) -> ApiResult<Json<Vec<Song>>> {
    let songs = state.store.list_recycled().await?;
    Ok(Json(songs))
}

/// POST /api/recycle-bin/:id/restore
///
/// Restoring a song that is already active is a successful no-op.
pub async fn restore_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_song_id(&id)?;

    state.store.restore(id).await.map_err(|e| {
        if e.is_not_found() {
            warn!("Song with id {} not found", id);
        }
        ApiError::from(e)
    })?;

    Ok(Json(MessageResponse::new("Song restored")))
}

/// DELETE /api/recycle-bin/:id
///
/// Removes the record whatever its flag. The stored file is kept.
pub async fn purge_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_song_id(&id)?;

    let song = state.store.purge(id).await.map_err(|e| {
        if e.is_not_found() {
            error!("Song with id {} not found", id);
        } else {
            error!("Error deleting song with id {}: {}", id, e);
        }
        ApiError::from(e)
    })?;

    if let Some(path) = state.files.resolve(&song.file_path) {
        info!("Purged song {}; file remains at {}", id, path.display());
    }

    Ok(Json(MessageResponse::new("Song permanently deleted")))
}
