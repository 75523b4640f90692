//! # tunebin common library
//!
//! Shared code for the tunebin catalog service:
//! - Error taxonomy
//! - Configuration loading and root folder resolution
//! - Database initialization, song records and the catalog store
//! - Time and UUID helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use db::{CatalogStore, NewSong, Song, SongState};
pub use error::{Error, Result};
