//! File store for uploaded audio
//!
//! Files land in the uploads directory as `<millis>-<sanitized name>` and
//! are referenced from catalog records by their server-relative path
//! (`uploads/<file name>`). Nothing here deletes a stored file.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use tunebin_common::config::UPLOADS_DIR;
use tunebin_common::{time, uuid_utils};

/// Longest file name most filesystems accept, in bytes
const MAX_FILE_NAME_BYTES: usize = 255;

/// Room kept for `<13-digit millis>-` and the `<8 hex>-` collision fragment
const RESERVED_PREFIX_BYTES: usize = 14 + 9;

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File too large: {0} bytes (max: {1})")]
    FileTooLarge(u64, u64),
}

/// A file written by [`FileStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name inside the uploads directory
    pub file_name: String,
    /// `uploads/<file_name>`, the value recorded as `filePath`
    pub relative_path: String,
    /// Location on disk
    pub absolute_path: PathBuf,
}

/// Local directory holding uploaded audio files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    max_file_size: u64,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            dir: dir.into(),
            max_file_size,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Create the uploads directory.
    pub async fn init(&self) -> Result<(), FileStoreError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Write `data` under a collision-free name derived from `original_name`.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<StoredFile, FileStoreError> {
        let size = data.len() as u64;
        if size > self.max_file_size {
            return Err(FileStoreError::FileTooLarge(size, self.max_file_size));
        }

        let safe_name = sanitize_filename(original_name)?;
        fs::create_dir_all(&self.dir).await?;

        let prefix = time::now_millis();
        let mut file_name = format!("{}-{}", prefix, safe_name);
        let mut file = match create_new(&self.dir.join(&file_name)).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                file_name = format!("{}-{}-{}", prefix, uuid_utils::short_fragment(), safe_name);
                debug!("Upload name collision, retrying as {}", file_name);
                create_new(&self.dir.join(&file_name)).await?
            }
            Err(e) => return Err(e.into()),
        };

        file.write_all(data).await?;
        file.flush().await?;

        let absolute_path = self.dir.join(&file_name);
        Ok(StoredFile {
            relative_path: format!("{}/{}", UPLOADS_DIR, file_name),
            file_name,
            absolute_path,
        })
    }

    /// Map a recorded `filePath` back to its location on disk.
    ///
    /// Returns `None` for paths outside the uploads directory.
    pub fn resolve(&self, relative_path: &str) -> Option<PathBuf> {
        let name = relative_path.strip_prefix(UPLOADS_DIR)?.strip_prefix('/')?;
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => Some(self.dir.join(part)),
            _ => None,
        }
    }
}

async fn create_new(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
}

/// Reduce a client-supplied filename to a single safe path component.
pub fn sanitize_filename(filename: &str) -> Result<String, FileStoreError> {
    // Browsers on Windows may send the full client path
    let last = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename);

    let name = Path::new(last)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| FileStoreError::InvalidFilename(filename.to_string()))?;

    if name.contains('\0') || name.starts_with('.') {
        return Err(FileStoreError::InvalidFilename(filename.to_string()));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(FileStoreError::InvalidFilename(filename.to_string()));
    }

    if sanitized.len() + RESERVED_PREFIX_BYTES > MAX_FILE_NAME_BYTES {
        return Err(FileStoreError::InvalidFilename(format!(
            "name is {} bytes (max: {})",
            sanitized.len(),
            MAX_FILE_NAME_BYTES - RESERVED_PREFIX_BYTES
        )));
    }

    Ok(sanitized)
}
