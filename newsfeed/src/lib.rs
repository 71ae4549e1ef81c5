// Library interface for newsfeed modules
// This allows tests and the binaries to import modules

pub mod error;
pub mod format;
pub mod ingestion;
pub mod manager;
pub mod prompt;
pub mod query;
pub mod storage;

pub use common::Article;
pub use error::FeedError;
pub use format::OutputMode;
pub use ingestion::{ArticleSource, FeedSourceClient};
pub use manager::FeedManager;
pub use query::{Operation, QueryResult};
pub use storage::{ArticleStore, LoadOutcome};
