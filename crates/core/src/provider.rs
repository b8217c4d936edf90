//! Provider adapters: the per-website scrapers feeding the library.
//!
//! Adapters live outside this crate. The core only relies on the [`Provider`]
//! trait and on the capabilities each adapter declares about itself.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use novella_types::RemoteMetadata;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::merge::IdStability;

/// Failure to obtain data from a provider.
///
/// Adapters map every provider specific problem (HTTP status, markup changes,
/// expired cookies) onto this type.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Fetch failed: {message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),
}

impl ProviderError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
            source: None,
        }
    }
}

/// Static facts an adapter declares about its provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    /// How far chapter ids can be trusted across fetches.
    #[serde(default)]
    pub id_stability: IdStability,
    /// Stored novels from this provider are never refreshed.
    #[serde(default)]
    pub refresh_exempt: bool,
}

/// Chapter text as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteChapter {
    pub paragraphs: Vec<String>,
}

/// Which ranking list to fetch and how to filter it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankOptions {
    pub list: String,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

/// One novel in a provider ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankItem {
    pub novel_id: String,
    pub title: String,
    #[serde(default)]
    pub attentions: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub extra: String,
}

/// A source of web-novel content.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier used in every novel key from this provider.
    fn id(&self) -> &str;

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::default()
    }

    /// Establish session cookies for providers that need them.
    async fn seed_cookies(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn get_metadata(&self, novel_id: &str) -> Result<RemoteMetadata, ProviderError>;

    async fn get_chapter(
        &self,
        novel_id: &str,
        chapter_id: &str,
    ) -> Result<RemoteChapter, ProviderError>;

    async fn get_rank(&self, options: &RankOptions) -> Result<Vec<RankItem>, ProviderError>;
}

/// Registered adapters, looked up by provider id.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter, replacing any previous one with the same id.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    pub fn with(mut self, provider: Arc<dyn Provider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(provider_id).cloned()
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers.values()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}
