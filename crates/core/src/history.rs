//! Review queue of TOC merges that may have lost chapters or translations.

use novella_types::{NovelKey, TocMergeHistoryEntry};
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::library::Library;

impl Library {
    /// List merge history, newest first, optionally for a single novel.
    pub async fn merge_history(&self, novel: Option<&NovelKey>) -> Result<Vec<TocMergeHistoryEntry>> {
        Ok(self.storage.list_merge_history(novel).await?)
    }

    pub async fn merge_history_entry(&self, id: &Uuid) -> Result<TocMergeHistoryEntry> {
        self.storage
            .get_merge_history(id)
            .await?
            .ok_or_else(|| Error::not_found("History entry", id))
    }

    /// Dismiss a reviewed entry.
    pub async fn delete_merge_history(&self, id: &Uuid) -> Result<()> {
        if !self.storage.delete_merge_history(id).await? {
            return Err(Error::not_found("History entry", id));
        }
        info!("Dismissed merge history entry {}", id);
        Ok(())
    }
}
