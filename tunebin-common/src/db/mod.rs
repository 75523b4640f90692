//! Database models and queries

pub mod init;
pub mod models;
pub mod songs;

pub use init::{init_database, init_in_memory};
pub use models::{NewSong, Song, SongState};
pub use songs::CatalogStore;
