//! Error types for the novel storage system.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Novel not found: {key}")]
    NovelNotFound {
        key: String,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error("Chapter not found: {key}")]
    ChapterNotFound {
        key: String,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error("History entry not found: {id}")]
    HistoryNotFound {
        id: String,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error("Novel already exists: {key}")]
    NovelAlreadyExists {
        key: String,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error("Chapter already exists: {key}")]
    ChapterAlreadyExists {
        key: String,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error("Invalid data: {message}")]
    InvalidData {
        message: String,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error("Data conversion failed: {message}")]
    DataConversionError {
        message: String,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error("Storage backend error")]
    BackendError {
        #[source]
        source: Option<eyre::Report>,
    },
}

impl StorageError {
    pub(crate) fn backend(context: &str, err: impl std::fmt::Display) -> Self {
        Self::BackendError {
            source: Some(eyre::eyre!("{}: {}", context, err)),
        }
    }

    pub(crate) fn conversion(message: &str, err: serde_json::Error) -> Self {
        Self::DataConversionError {
            message: message.to_string(),
            source: Some(eyre::eyre!("JSON error: {}", err)),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NovelNotFound { .. } | Self::ChapterNotFound { .. } | Self::HistoryNotFound { .. }
        )
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Self::NovelAlreadyExists { .. } | Self::ChapterAlreadyExists { .. }
        )
    }
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
