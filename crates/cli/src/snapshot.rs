//! Provider adapter serving scraped snapshots from a local directory.
//!
//! Layout under the snapshot directory:
//! - `{novel_id}.json`: metadata
//! - `{novel_id}/{chapter_id}.json`: chapter text
//! - `rank/{list}.json`: ranking list

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use novella_core::{
    Provider, ProviderCapabilities, ProviderError, RankItem, RankOptions, RemoteChapter,
};
use novella_types::RemoteMetadata;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::debug;

use crate::config::ProviderConfig;

const RANK_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    id: String,
    root: PathBuf,
    capabilities: ProviderCapabilities,
}

impl SnapshotProvider {
    pub fn new(id: impl Into<String>, root: impl Into<PathBuf>, capabilities: ProviderCapabilities) -> Self {
        Self {
            id: id.into(),
            root: root.into(),
            capabilities,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(&config.id, &config.snapshot_dir, config.capabilities())
    }

    /// Ids come from the command line; keep them inside the snapshot directory.
    fn segment(id: &str) -> Result<&str, ProviderError> {
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(ProviderError::fetch(format!("Invalid id: {:?}", id)));
        }
        Ok(id)
    }

    async fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T, ProviderError> {
        debug!("Reading snapshot {}", path.display());
        let content = fs::read_to_string(path).await.map_err(|e| ProviderError::Fetch {
            message: format!("Failed to read {}", path.display()),
            source: Some(e.into()),
        })?;
        serde_json::from_str(&content).map_err(|e| ProviderError::Fetch {
            message: format!("Failed to parse {}", path.display()),
            source: Some(e.into()),
        })
    }
}

#[async_trait]
impl Provider for SnapshotProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    async fn get_metadata(&self, novel_id: &str) -> Result<RemoteMetadata, ProviderError> {
        let path = self
            .root
            .join(format!("{}.json", Self::segment(novel_id)?));
        self.read(&path).await
    }

    async fn get_chapter(
        &self,
        novel_id: &str,
        chapter_id: &str,
    ) -> Result<RemoteChapter, ProviderError> {
        let path = self
            .root
            .join(Self::segment(novel_id)?)
            .join(format!("{}.json", Self::segment(chapter_id)?));
        self.read(&path).await
    }

    async fn get_rank(&self, options: &RankOptions) -> Result<Vec<RankItem>, ProviderError> {
        let path = self
            .root
            .join("rank")
            .join(format!("{}.json", Self::segment(&options.list)?));
        let items: Vec<RankItem> = self.read(&path).await?;

        Ok(items
            .into_iter()
            .filter(|item| {
                options
                    .filters
                    .get("keyword")
                    .is_none_or(|keyword| item.keywords.iter().any(|k| k == keyword))
            })
            .skip(options.page as usize * RANK_PAGE_SIZE)
            .take(RANK_PAGE_SIZE)
            .collect())
    }
}
