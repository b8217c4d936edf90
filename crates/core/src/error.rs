use novella_storage::StorageError;
use thiserror::Error;

use crate::provider::ProviderError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by library operations.
///
/// Only the refresh path recovers from upstream failures on its own (by
/// serving stale data); everything else reaches the caller as one of these.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested novel, chapter, provider or history entry does not exist.
    #[error("{what} not found: {key}")]
    NotFound { what: &'static str, key: String },

    /// The provider could not be reached or its response could not be parsed.
    #[error("Upstream fetch failed for {key}")]
    UpstreamFetch {
        key: String,
        #[source]
        source: ProviderError,
    },

    /// The write raced with another one or was based on stale state, such as
    /// a translation produced under an outdated glossary.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The input was rejected before anything was written.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The storage backend failed.
    #[error(transparent)]
    Storage(StorageError),
}

impl Error {
    pub(crate) fn not_found(what: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            what,
            key: key.to_string(),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NovelNotFound { key, .. } => Self::NotFound {
                what: "Novel",
                key,
            },
            StorageError::ChapterNotFound { key, .. } => Self::NotFound {
                what: "Chapter",
                key,
            },
            StorageError::HistoryNotFound { id, .. } => Self::NotFound {
                what: "History entry",
                key: id,
            },
            StorageError::NovelAlreadyExists { key, .. } => {
                Self::Conflict(format!("novel {} already exists", key))
            }
            StorageError::ChapterAlreadyExists { key, .. } => {
                Self::Conflict(format!("chapter {} already exists", key))
            }
            StorageError::InvalidData { message, .. } => Self::Validation(message),
            other => Self::Storage(other),
        }
    }
}

/// Failure reported by an external collaborator such as the search index or
/// the favorites store.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CollaboratorError {
    pub message: String,
    #[source]
    pub source: Option<eyre::Report>,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}
