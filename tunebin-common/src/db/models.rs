//! Database models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog record for one uploaded song
///
/// Serialized as `{ id, title, artist, genre, filePath, isDeleted }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    /// Assigned once at upload, never changed
    pub genre: String,
    /// Server-relative path of the stored audio file, e.g. `uploads/1712-a.mp3`
    pub file_path: String,
    /// Soft-delete flag; `true` means the song sits in the recycle bin
    pub is_deleted: bool,
}

/// Lifecycle state of a song that still exists
///
/// Purged songs have no record and therefore no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SongState {
    Active,
    Recycled,
}

impl Song {
    pub fn state(&self) -> SongState {
        if self.is_deleted {
            SongState::Recycled
        } else {
            SongState::Active
        }
    }
}

/// Input for creating a catalog record
#[derive(Debug, Clone)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub file_path: String,
}
