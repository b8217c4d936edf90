//! The [`Library`] facade tying storage, providers and collaborators together.
//!
//! Operations are implemented next to the concern they belong to: refresh in
//! `refresh.rs`, translation progress in `translation.rs`, and so on.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use novella_storage::{NovelFilter, NovelStorage, NovelSummary};
use novella_types::{Novel, NovelKey};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::favorites::{FavoritesStore, MemoryFavorites};
use crate::provider::{Provider, ProviderError, ProviderRegistry, RankItem, RankOptions};
use crate::search::{MemorySearchIndex, NovelDocument, SearchIndex};
use crate::views::ViewLimiter;

/// Tunables of a [`Library`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryOptions {
    /// Upper bound on every provider call.
    pub fetch_timeout: Duration,
    /// Window during which repeated views by one viewer are not counted.
    pub view_cooldown: Duration,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            view_cooldown: Duration::from_secs(300),
        }
    }
}

pub struct Library {
    pub(crate) storage: Arc<dyn NovelStorage>,
    pub(crate) providers: ProviderRegistry,
    pub(crate) search: Arc<dyn SearchIndex>,
    pub(crate) favorites: Arc<dyn FavoritesStore>,
    pub(crate) views: ViewLimiter,
    pub(crate) options: LibraryOptions,
}

impl Library {
    /// Create a library with process-local search and favorites.
    pub fn new(storage: Arc<dyn NovelStorage>, providers: ProviderRegistry) -> Self {
        let options = LibraryOptions::default();
        Self {
            storage,
            providers,
            search: Arc::new(MemorySearchIndex::new()),
            favorites: Arc::new(MemoryFavorites::new()),
            views: ViewLimiter::new(options.view_cooldown),
            options,
        }
    }

    pub fn with_search_index(mut self, search: Arc<dyn SearchIndex>) -> Self {
        self.search = search;
        self
    }

    pub fn with_favorites(mut self, favorites: Arc<dyn FavoritesStore>) -> Self {
        self.favorites = favorites;
        self
    }

    pub fn with_options(mut self, options: LibraryOptions) -> Self {
        self.views = ViewLimiter::new(options.view_cooldown);
        self.options = options;
        self
    }

    pub fn storage(&self) -> &Arc<dyn NovelStorage> {
        &self.storage
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn options(&self) -> &LibraryOptions {
        &self.options
    }

    /// Get a stored novel without contacting its provider.
    pub async fn get_novel(&self, key: &NovelKey) -> Result<Novel> {
        self.storage
            .get_novel(key)
            .await?
            .ok_or_else(|| Error::not_found("Novel", key))
    }

    pub async fn list_novels(&self, filter: &NovelFilter) -> Result<Vec<NovelSummary>> {
        Ok(self.storage.list_novels(filter).await?)
    }

    /// Fetch a ranking list straight from a provider. Rankings are not stored.
    pub async fn get_rank(&self, provider_id: &str, options: &RankOptions) -> Result<Vec<RankItem>> {
        let provider = self.provider(provider_id)?;
        let items = self
            .call_provider(provider.get_rank(options))
            .await
            .map_err(|source| Error::UpstreamFetch {
                key: format!("{}/rank/{}", provider_id, options.list),
                source,
            })?;
        debug!("Fetched {} ranked novels from {}", items.len(), provider_id);
        Ok(items)
    }

    /// Let every registered adapter establish its session.
    ///
    /// Failures are logged; an adapter without cookies can still serve
    /// whatever does not need them.
    pub async fn seed_cookies(&self) {
        for provider in self.providers.iter() {
            if let Err(e) = self.call_provider(provider.seed_cookies()).await {
                warn!("Failed to seed cookies for {}: {}", provider.id(), e);
            }
        }
    }

    pub(crate) fn provider(&self, provider_id: &str) -> Result<Arc<dyn Provider>> {
        self.providers
            .get(provider_id)
            .ok_or_else(|| Error::not_found("Provider", provider_id))
    }

    /// Run a provider call under the configured timeout.
    pub(crate) async fn call_provider<T, F>(&self, call: F) -> std::result::Result<T, ProviderError>
    where
        F: Future<Output = std::result::Result<T, ProviderError>>,
    {
        let timeout = self.options.fetch_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(timeout)),
        }
    }

    /// Push the novel to the search index.
    ///
    /// Runs after the novel is committed, so a failure only leaves the index
    /// behind; it is logged rather than failing the operation.
    pub(crate) async fn reindex(&self, novel: &Novel) {
        if let Err(e) = self.search.index(&NovelDocument::from(novel)).await {
            warn!("Failed to index novel {}: {}", novel.key(), e);
        }
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("providers", &self.providers)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
