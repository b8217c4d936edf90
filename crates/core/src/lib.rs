//! Metadata aggregation for serialized web novels.
//!
//! The [`Library`] keeps a local copy of every novel it has been asked about,
//! refreshes it from the novel's [`Provider`] when it goes stale, reconciles
//! tables of contents with [`merge_toc`], and tracks how far each translation
//! engine has progressed through the stored chapters.

mod chapter;
pub mod error;
pub mod favorites;
mod glossary;
mod history;
pub mod library;
pub mod merge;
mod patch;
pub mod provider;
pub mod refresh;
pub mod search;
mod translation;
pub mod views;

pub use error::{CollaboratorError, Error, Result};
pub use favorites::{FavoriteRecord, FavoritesStore, MemoryFavorites};
pub use library::{Library, LibraryOptions};
pub use merge::{IdStability, MergeOutcome, ReviewReason, merge_toc};
pub use provider::{
    Provider, ProviderCapabilities, ProviderError, ProviderRegistry, RankItem, RankOptions,
    RemoteChapter,
};
pub use refresh::within_expiry;
pub use search::{MemorySearchIndex, NovelDocument, SearchIndex};
pub use views::ViewLimiter;
