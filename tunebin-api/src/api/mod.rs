//! HTTP API handlers for tunebin-api

pub mod health;
pub mod recycle_bin;
pub mod songs;

pub use health::health_routes;
pub use recycle_bin::{list_recycle_bin, purge_song, restore_song};
pub use songs::{list_songs, soft_delete_song, upload_song};

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Confirmation body for state transitions
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse a song id from the URL; anything that is not a UUID names no song
pub(crate) fn parse_song_id(raw: &str) -> ApiResult<Uuid> {
    tunebin_common::uuid_utils::parse(raw).map_err(|_| {
        warn!("Song with id {} not found (malformed id)", raw);
        ApiError::song_not_found()
    })
}
