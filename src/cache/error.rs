use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read cache entry file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to write cache entry file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode cache entry '{key}'")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode cache entry '{key}'")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No cache entry '{0}' to update")]
    MissingEntry(String),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
