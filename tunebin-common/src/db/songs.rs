//! Catalog store: song persistence and the soft-delete state machine
//!
//! States and transitions:
//! - `active -> recycled` via [`CatalogStore::soft_delete`]
//! - `recycled -> active` via [`CatalogStore::restore`]
//! - `* -> purged` via [`CatalogStore::purge`] (record removed, irreversible)
//!
//! Soft delete and restore are idempotent. Purge does not check the flag.
//! Stored audio files are never touched here.

use crate::db::models::{NewSong, Song};
use crate::{time, uuid_utils, Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Message carried by every unknown-id failure
pub const SONG_NOT_FOUND: &str = "Song not found";

const SONG_COLUMNS: &str = "id, title, artist, genre, file_path, is_deleted";

/// Handle to the song catalog
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone, Debug)]
pub struct CatalogStore {
    pool: SqlitePool,
}

impl CatalogStore {
    /// Open (or create) the catalog database file
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = crate::db::init_database(db_path).await?;
        Ok(Self { pool })
    }

    /// Catalog backed by a private in-memory database
    pub async fn in_memory() -> Result<Self> {
        let pool = crate::db::init_in_memory().await?;
        Ok(Self { pool })
    }

    /// Close the underlying pool, waiting for checked-out connections
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Catalog store closed");
    }

    /// Songs not in the recycle bin
    pub async fn list_active(&self) -> Result<Vec<Song>> {
        self.list_by_flag(false).await
    }

    /// Songs in the recycle bin
    pub async fn list_recycled(&self) -> Result<Vec<Song>> {
        self.list_by_flag(true).await
    }

    async fn list_by_flag(&self, is_deleted: bool) -> Result<Vec<Song>> {
        let sql = format!(
            "SELECT {} FROM songs WHERE is_deleted = ? ORDER BY created_at ASC, rowid ASC",
            SONG_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(is_deleted)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(song_from_row).collect()
    }

    /// Insert a new active song with a fresh id
    pub async fn create(&self, new_song: NewSong) -> Result<Song> {
        let id = uuid_utils::generate();
        let now = time::now_rfc3339();

        let sql = format!(
            r#"
            INSERT INTO songs (id, title, artist, genre, file_path, is_deleted, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?)
            RETURNING {}
            "#,
            SONG_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(&new_song.title)
            .bind(&new_song.artist)
            .bind(&new_song.genre)
            .bind(&new_song.file_path)
            .bind(&now)
            .bind(&now)
            .fetch_one(&self.pool)
            .await?;

        let song = song_from_row(&row)?;
        info!("Created song {} ({})", song.id, song.file_path);
        Ok(song)
    }

    /// Look up a song regardless of its flag
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Song>> {
        let sql = format!("SELECT {} FROM songs WHERE id = ?", SONG_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(song_from_row).transpose()
    }

    /// Move a song to the recycle bin
    pub async fn soft_delete(&self, id: Uuid) -> Result<Song> {
        let song = self.set_deleted(id, true).await?;
        info!("Song {} moved to recycle bin", id);
        Ok(song)
    }

    /// Bring a song back from the recycle bin
    pub async fn restore(&self, id: Uuid) -> Result<Song> {
        let song = self.set_deleted(id, false).await?;
        info!("Song {} restored", id);
        Ok(song)
    }

    async fn set_deleted(&self, id: Uuid, is_deleted: bool) -> Result<Song> {
        let sql = format!(
            "UPDATE songs SET is_deleted = ?, updated_at = ? WHERE id = ? RETURNING {}",
            SONG_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(is_deleted)
            .bind(time::now_rfc3339())
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => song_from_row(&row),
            None => {
                debug!("set_deleted({}) on unknown song {}", is_deleted, id);
                Err(Error::NotFound(SONG_NOT_FOUND.to_string()))
            }
        }
    }

    /// Remove a song record permanently, returning what was removed
    pub async fn purge(&self, id: Uuid) -> Result<Song> {
        let sql = format!("DELETE FROM songs WHERE id = ? RETURNING {}", SONG_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let song = song_from_row(&row)?;
                info!("Song {} permanently deleted (file {} kept)", id, song.file_path);
                Ok(song)
            }
            None => Err(Error::NotFound(SONG_NOT_FOUND.to_string())),
        }
    }
}

fn song_from_row(row: &SqliteRow) -> Result<Song> {
    let id_str: String = row.try_get("id")?;
    let id = uuid_utils::parse(&id_str)
        .map_err(|e| Error::Database(sqlx::Error::Decode(Box::new(e))))?;

    Ok(Song {
        id,
        title: row.try_get("title")?,
        artist: row.try_get("artist")?,
        genre: row.try_get("genre")?,
        file_path: row.try_get("file_path")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}
