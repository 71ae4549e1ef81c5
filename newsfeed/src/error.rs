use std::path::PathBuf;

/// Failures surfaced by the fetch/refresh path.
///
/// Read-path problems never appear here: the store folds them into an empty
/// collection (see [`crate::storage::LoadOutcome`]).
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("sensor {sensor} unavailable: {error}")]
    SourceUnavailable {
        sensor: String,
        #[source]
        error: reqwest::Error,
    },

    #[error("malformed payload from sensor {sensor}: {reason}")]
    MalformedPayload { sensor: String, reason: String },

    #[error("failed to write news file {}: {error}", .path.display())]
    StoreWriteFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("invalid source base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl FeedError {
    pub(crate) fn unavailable(sensor: &str, error: reqwest::Error) -> Self {
        Self::SourceUnavailable {
            sensor: sensor.to_string(),
            error,
        }
    }

    pub(crate) fn malformed(sensor: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            sensor: sensor.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
