use common::Article;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{FeedError, Result};

/// What a read of the news file actually found.
///
/// Callers of [`ArticleStore::load`] only ever see a collection; this keeps
/// the degraded cases visible for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(Vec<Article>),
    /// The file does not exist yet (no successful refresh so far).
    Missing,
    /// The file exists but is not a JSON array of articles.
    Corrupt(String),
    /// The file could not be read (permissions, is a directory, ...).
    Unreadable(String),
}

impl LoadOutcome {
    pub fn into_articles(self) -> Vec<Article> {
        match self {
            LoadOutcome::Loaded(articles) => articles,
            _ => Vec::new(),
        }
    }
}

/// The news collection persisted as one pretty-printed JSON array.
///
/// There is no locking: two writers saving at once both succeed and the
/// last rename wins.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    path: PathBuf,
}

impl ArticleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load_outcome(&self) -> LoadOutcome {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadOutcome::Missing,
            Err(e) => return LoadOutcome::Unreadable(e.to_string()),
        };

        match serde_json::from_slice::<Vec<Article>>(&bytes) {
            Ok(articles) => LoadOutcome::Loaded(articles),
            Err(e) => LoadOutcome::Corrupt(e.to_string()),
        }
    }

    /// Read the whole collection. Missing or unusable files read as empty.
    pub async fn load(&self) -> Vec<Article> {
        let outcome = self.load_outcome().await;
        match &outcome {
            LoadOutcome::Loaded(articles) => {
                debug!(path = %self.path.display(), count = articles.len(), "loaded news file");
            }
            LoadOutcome::Missing => {
                warn!(path = %self.path.display(), "news file not found");
            }
            LoadOutcome::Corrupt(reason) => {
                warn!(path = %self.path.display(), %reason, "error decoding JSON from news file");
            }
            LoadOutcome::Unreadable(reason) => {
                warn!(path = %self.path.display(), %reason, "could not read news file");
            }
        }
        outcome.into_articles()
    }

    /// Replace the stored collection with `articles`.
    ///
    /// The JSON goes to a uniquely named temp file next to the target, which
    /// is then renamed over it, so readers see either the old or the new
    /// document.
    pub async fn save(&self, articles: &[Article]) -> Result<()> {
        let body = serde_json::to_string_pretty(articles)
            .map_err(|e| self.write_failed(std::io::Error::new(ErrorKind::InvalidData, e)))?;

        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.write_failed(e))?;
                parent.to_path_buf()
            }
            None => PathBuf::from("."),
        };

        let target = self.path.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            // Dropped (and deleted) on any error before persist.
            let mut tmp = tempfile::Builder::new()
                .prefix(".news-")
                .suffix(".tmp")
                .tempfile_in(&dir)?;
            tmp.write_all(body.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| self.write_failed(std::io::Error::new(ErrorKind::Other, e)))?
        .map_err(|e| self.write_failed(e))?;

        info!(path = %self.path.display(), count = articles.len(), "news file written");
        Ok(())
    }

    fn write_failed(&self, error: std::io::Error) -> FeedError {
        FeedError::StoreWriteFailed {
            path: self.path.clone(),
            error,
        }
    }
}
