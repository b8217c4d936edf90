//! Trait definitions for the novel storage system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use novella_types::{
    Chapter, ChapterKey, CountTarget, Novel, NovelKey, PatchEntry, TocMergeHistoryEntry,
    TranslationSlot, Translator,
};
use uuid::Uuid;

use crate::error::Result;
use crate::types::{NovelFilter, NovelSummary, NovelUpdate};

/// Main trait for novel storage operations.
///
/// Every mutating method is a single atomic step keyed by the novel or
/// chapter identity. Implementations never hold locks across calls, so
/// callers composing several steps must tolerate interleaving.
#[async_trait]
pub trait NovelStorage: Send + Sync {
    // === Novel Operations ===

    /// Insert a novel fetched for the first time.
    ///
    /// Fails with `NovelAlreadyExists` if the key is taken.
    async fn insert_novel(&self, novel: &Novel) -> Result<()>;

    /// Get a novel by its key.
    ///
    /// # Returns
    /// `Some(novel)` if found, `None` if not found
    async fn get_novel(&self, key: &NovelKey) -> Result<Option<Novel>>;

    /// Atomically apply a partial update and return the updated novel.
    ///
    /// Fails with `NovelNotFound` if the novel does not exist.
    async fn update_novel(&self, key: &NovelKey, update: NovelUpdate) -> Result<Novel>;

    /// List novels with optional filtering.
    async fn list_novels(&self, filter: &NovelFilter) -> Result<Vec<NovelSummary>>;

    // === Chapter Operations ===

    /// Insert a chapter fetched for the first time.
    ///
    /// Fails with `ChapterAlreadyExists` if the key is taken, which happens
    /// when two readers fetch the same uncached chapter concurrently.
    async fn insert_chapter(&self, chapter: &Chapter) -> Result<()>;

    /// Get a chapter by its key.
    async fn get_chapter(&self, key: &ChapterKey) -> Result<Option<Chapter>>;

    /// Store a chapter, replacing any existing record.
    async fn put_chapter(&self, chapter: &Chapter) -> Result<()>;

    /// Replace one engine's translation of a chapter, leaving every other
    /// engine's fields untouched.
    ///
    /// Fails with `ChapterNotFound` if the chapter does not exist.
    async fn set_translation(
        &self,
        key: &ChapterKey,
        translator: Translator,
        slot: TranslationSlot,
    ) -> Result<Chapter>;

    /// Count stored chapters of a novel holding text for the given target.
    ///
    /// This is a full recount, never an incrementally maintained value.
    async fn count_chapters(&self, novel: &NovelKey, target: CountTarget) -> Result<u32>;

    /// Recount the given targets and store them on the novel with `change_at`,
    /// as one step that excludes concurrent chapter writes.
    ///
    /// Fails with `NovelNotFound` if the novel does not exist.
    async fn recount_novel(
        &self,
        key: &NovelKey,
        targets: &[CountTarget],
        change_at: DateTime<Utc>,
    ) -> Result<Novel>;

    // === TOC Merge History ===

    /// Append a merge review record.
    async fn append_merge_history(&self, entry: &TocMergeHistoryEntry) -> Result<()>;

    /// List merge review records, newest first, optionally for one novel.
    async fn list_merge_history(
        &self,
        novel: Option<&NovelKey>,
    ) -> Result<Vec<TocMergeHistoryEntry>>;

    /// Get a merge review record by id.
    async fn get_merge_history(&self, id: &Uuid) -> Result<Option<TocMergeHistoryEntry>>;

    /// Delete a merge review record once a moderator has handled it.
    ///
    /// # Returns
    /// `true` if the record was deleted, `false` if it didn't exist
    async fn delete_merge_history(&self, id: &Uuid) -> Result<bool>;

    // === Patch History ===

    /// Append an applied patch to the novel's log.
    async fn append_patch(&self, entry: &PatchEntry) -> Result<()>;

    /// List a novel's patches, oldest first.
    async fn list_patches(&self, novel: &NovelKey) -> Result<Vec<PatchEntry>>;

    /// Drop a novel's patch log.
    async fn clear_patches(&self, novel: &NovelKey) -> Result<()>;
}
