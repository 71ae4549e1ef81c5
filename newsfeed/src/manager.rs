use common::{Article, Config};
use std::sync::Arc;
use tracing::{error, info};

use crate::error::Result;
use crate::ingestion::{ArticleSource, FeedSourceClient};
use crate::storage::ArticleStore;

/// Ties the sensor client to the JSON store.
///
/// Holds no article state of its own: every query re-reads the store, and
/// only [`FeedManager::refresh`] touches the network.
pub struct FeedManager {
    source: Arc<dyn ArticleSource>,
    store: ArticleStore,
    sensors: Vec<String>,
    credential: String,
}

impl FeedManager {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        store: ArticleStore,
        sensors: Vec<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            sensors,
            credential: credential.into(),
        }
    }

    /// Build the HTTP-backed manager described by `config`.
    pub fn from_config(config: &Config, credential: impl Into<String>) -> Result<Self> {
        let client = FeedSourceClient::new(&config.source)?;
        Ok(Self::new(
            Arc::new(client),
            ArticleStore::new(&config.store.path),
            config.source.sensors.clone(),
            credential,
        ))
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    /// Fetch every sensor and replace the store. Returns the number of
    /// articles written. Nothing is written if any sensor fails.
    pub async fn try_refresh(&self) -> Result<usize> {
        let articles = self.source.fetch(&self.sensors, &self.credential).await?;
        self.store.save(&articles).await?;
        Ok(articles.len())
    }

    /// [`FeedManager::try_refresh`] reduced to success/failure; the error is logged.
    pub async fn refresh(&self) -> bool {
        match self.try_refresh().await {
            Ok(count) => {
                info!(count, sensors = self.sensors.len(), "news data updated");
                true
            }
            Err(e) => {
                error!(error = %e, "error updating news data");
                false
            }
        }
    }

    pub async fn list_titles(&self) -> Vec<String> {
        self.store
            .load()
            .await
            .into_iter()
            .map(|article| article.title)
            .collect()
    }

    /// First article whose title matches exactly; earlier entries win on duplicates.
    pub async fn find_by_title(&self, title: &str) -> Option<Article> {
        self.store
            .load()
            .await
            .into_iter()
            .find(|article| article.title == title)
    }

    pub async fn dump_all(&self) -> Vec<Article> {
        self.store.load().await
    }
}
