//! Genre classification
//!
//! The real classifier is an external service that takes the path of a
//! stored file and answers with a genre label. Only a stub ships here; it
//! gives every upload the same configured label.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tunebin_common::config::DEFAULT_GENRE_LABEL;

/// Assigns a genre label to a stored audio file
#[async_trait]
pub trait GenreClassifier: Send + Sync {
    /// Classify the file at `file_path`
    async fn classify(&self, file_path: &Path) -> Result<String>;
}

/// Classifier that ignores the file and returns a fixed label
#[derive(Debug, Clone)]
pub struct StubGenreClassifier {
    label: String,
}

impl StubGenreClassifier {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl Default for StubGenreClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_GENRE_LABEL)
    }
}

#[async_trait]
impl GenreClassifier for StubGenreClassifier {
    async fn classify(&self, file_path: &Path) -> Result<String> {
        tracing::debug!("Stub classifier labelling {} as {}", file_path.display(), self.label);
        Ok(self.label.clone())
    }
}
