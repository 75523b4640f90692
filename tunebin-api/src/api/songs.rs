//! Active song routes: listing, upload, and moving songs to the recycle bin

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info, warn};
use tunebin_common::{NewSong, Song};

use super::{parse_song_id, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/songs
///
/// Songs not in the recycle bin.
pub async fn list_songs(State(state): State<AppState>) -> ApiResult<Json<Vec<Song>>> {
    let songs = state.store.list_active().await?;
    Ok(Json(songs))
}

/// Fields read from the upload form
#[derive(Debug)]
pub struct UploadForm {
    pub file_name: String,
    pub data: Bytes,
    pub title: String,
    pub artist: String,
}

/// Collect the `file`, `title` and `artist` parts; other parts are ignored
pub async fn read_upload_form(multipart: &mut Multipart) -> ApiResult<UploadForm> {
    let mut file: Option<(String, Bytes)> = None;
    let mut title = String::new();
    let mut artist = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                if file.is_some() {
                    return Err(ApiError::Validation(
                        "Exactly one file must be uploaded".to_string(),
                    ));
                }
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| ApiError::Validation("No filename provided".to_string()))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read file: {}", e)))?;
                file = Some((file_name, data));
            }
            "title" | "artist" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read {}: {}", name, e)))?;
                if name == "title" {
                    title = value;
                } else {
                    artist = value;
                }
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| ApiError::Validation("No file uploaded".to_string()))?;
    if data.is_empty() {
        return Err(ApiError::Validation("No file data provided".to_string()));
    }

    Ok(UploadForm {
        file_name,
        data,
        title,
        artist,
    })
}

/// POST /api/songs
///
/// Stores the file, classifies it, then creates the catalog record. The file
/// stays on disk even when the record insert fails.
pub async fn upload_song(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let form = read_upload_form(&mut multipart).await?;

    let stored = state.files.save(&form.file_name, &form.data).await?;
    info!(
        "File uploaded to: {} ({} bytes)",
        stored.relative_path,
        form.data.len()
    );

    let genre = state
        .classifier
        .classify(&stored.absolute_path)
        .await
        .map_err(|e| ApiError::Validation(format!("Genre classification failed: {}", e)))?;

    let new_song = NewSong {
        title: form.title,
        artist: form.artist,
        genre,
        file_path: stored.relative_path.clone(),
    };

    let song = state.store.create(new_song).await.map_err(|e| {
        warn!(
            "Failed to create song record for {} (file left in place): {}",
            stored.relative_path, e
        );
        ApiError::Validation(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(song)))
}

/// DELETE /api/songs/:id
///
/// Moves the song to the recycle bin. Deleting a song already there succeeds.
pub async fn soft_delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_song_id(&id)?;

    state.store.soft_delete(id).await.map_err(|e| {
        if e.is_not_found() {
            warn!("Song with id {} not found", id);
        }
        ApiError::from(e)
    })?;

    Ok(Json(MessageResponse::new("Song moved to recycle bin")))
}
