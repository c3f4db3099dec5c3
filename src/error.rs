//! Error taxonomy for the directory core.

use thiserror::Error;

/// Failures surfaced by fetches, lookups and preference storage.
///
/// Missing optional fields in a payload are never an error; the normalizer
/// absorbs them. Only a body that is not JSON of the expected outer shape
/// ends up as [`DirectoryError::Decode`].
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("no country found for {query}")]
    NotFound { query: String },

    #[error("unexpected response body: {source}")]
    Decode {
        #[from]
        source: serde_json::Error,
    },

    #[error("preference storage: {message}")]
    Storage { message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl DirectoryError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn not_found(query: impl Into<String>) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// True for "no such country / no search hits", which callers treat as an
    /// empty result rather than a failure worth retrying.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
