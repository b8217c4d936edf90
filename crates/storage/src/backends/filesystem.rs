//! Filesystem-based storage backend implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use novella_types::{
    Chapter, ChapterKey, CountTarget, Novel, NovelKey, PatchEntry, TocMergeHistoryEntry,
    TranslationSlot, Translator,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::traits::NovelStorage;
use crate::types::{NovelFilter, NovelSummary, NovelUpdate};

/// Filesystem-based storage backend.
///
/// This implementation stores novels and chapters as JSON files in a structured
/// directory hierarchy on the local filesystem.
///
/// Directory structure:
/// ```text
/// storage_root/
/// +-- novels/
/// |   +-- {provider_id}/
/// |       +-- {novel_id_hash}/
/// |           +-- novel.json
/// |           +-- patches.json
/// |           +-- chapters/
/// |               +-- {chapter_id_hash}.json
/// +-- history/
///     +-- toc-merge/
///         +-- {entry_id}.json
/// ```
///
/// Every file is replaced through a rename, so readers never observe a
/// partial document. Read-modify-write cycles on one novel (its metadata,
/// chapters and patch log) are serialized by a per-novel lock.
#[derive(Debug, Clone)]
pub struct FilesystemStorage {
    root_path: PathBuf,
    locks: Arc<DashMap<NovelKey, Arc<Mutex<()>>>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocumentMetadata {
    stored_at: DateTime<Utc>,
}

impl DocumentMetadata {
    fn now() -> Self {
        Self {
            stored_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct NovelDocument {
    novel: Novel,
    metadata: DocumentMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChapterDocument {
    chapter: Chapter,
    metadata: DocumentMetadata,
}

impl FilesystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// # Arguments
    /// * `root_path` - Path to the root storage directory
    pub fn new<P: AsRef<Path>>(root_path: P) -> Self {
        Self {
            root_path: root_path.as_ref().to_path_buf(),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Initialize the storage directory structure.
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(self.root_path.join("novels"))
            .await
            .map_err(|e| StorageError::backend("Failed to create novels directory", e))?;

        fs::create_dir_all(self.merge_history_dir())
            .await
            .map_err(|e| StorageError::backend("Failed to create history directory", e))?;

        Ok(())
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn validate_key(&self, key: &NovelKey) -> Result<()> {
        let provider = key.provider_id.as_str();
        if provider.trim().is_empty()
            || provider == "."
            || provider == ".."
            || provider.contains(['/', '\\'])
        {
            return Err(StorageError::InvalidData {
                message: format!("Invalid provider id: {:?}", provider),
                source: None,
            });
        }

        if key.novel_id.trim().is_empty() {
            return Err(StorageError::InvalidData {
                message: "Novel id cannot be empty".to_string(),
                source: None,
            });
        }

        Ok(())
    }

    fn hash_string(&self, input: &str) -> String {
        format!("{:x}", Sha256::digest(input.as_bytes()))
    }

    fn get_novel_dir(&self, key: &NovelKey) -> PathBuf {
        self.root_path
            .join("novels")
            .join(&key.provider_id)
            .join(self.hash_string(&key.novel_id))
    }

    fn get_novel_file(&self, key: &NovelKey) -> PathBuf {
        self.get_novel_dir(key).join("novel.json")
    }

    fn get_patches_file(&self, key: &NovelKey) -> PathBuf {
        self.get_novel_dir(key).join("patches.json")
    }

    fn get_chapters_dir(&self, key: &NovelKey) -> PathBuf {
        self.get_novel_dir(key).join("chapters")
    }

    fn get_chapter_file(&self, key: &ChapterKey) -> PathBuf {
        self.get_chapters_dir(&key.novel)
            .join(format!("{}.json", self.hash_string(&key.chapter_id)))
    }

    fn merge_history_dir(&self) -> PathBuf {
        self.root_path.join("history").join("toc-merge")
    }

    fn get_merge_history_file(&self, id: &Uuid) -> PathBuf {
        self.merge_history_dir().join(format!("{}.json", id))
    }

    fn lock_for(&self, key: &NovelKey) -> Arc<Mutex<()>> {
        Arc::clone(&self.locks.entry(key.clone()).or_default())
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::backend(
                    &format!("Failed to read {}", path.display()),
                    e,
                ));
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StorageError::conversion("Failed to parse stored document", e))
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::backend("Failed to create directory", e))?;
        }

        let content = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::conversion("Failed to serialize document", e))?;

        let tmp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        fs::write(&tmp_path, content)
            .await
            .map_err(|e| StorageError::backend("Failed to write temporary file", e))?;

        fs::rename(&tmp_path, path)
            .await
            .map_err(|e| StorageError::backend("Failed to replace document", e))?;

        Ok(())
    }

    async fn read_novel(&self, key: &NovelKey) -> Result<Option<Novel>> {
        let doc: Option<NovelDocument> = self.read_json(&self.get_novel_file(key)).await?;
        Ok(doc.map(|d| d.novel))
    }

    async fn write_novel(&self, novel: &Novel) -> Result<()> {
        let doc = NovelDocument {
            novel: novel.clone(),
            metadata: DocumentMetadata::now(),
        };
        self.write_json(&self.get_novel_file(&novel.key()), &doc)
            .await
    }

    async fn read_chapter(&self, key: &ChapterKey) -> Result<Option<Chapter>> {
        let doc: Option<ChapterDocument> = self.read_json(&self.get_chapter_file(key)).await?;
        Ok(doc.map(|d| d.chapter))
    }

    async fn write_chapter(&self, chapter: &Chapter) -> Result<()> {
        let doc = ChapterDocument {
            chapter: chapter.clone(),
            metadata: DocumentMetadata::now(),
        };
        self.write_json(&self.get_chapter_file(&chapter.key()), &doc)
            .await
    }

    /// Paths of every `*.json` file directly inside `dir`.
    async fn json_files_in(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::backend("Failed to read directory", e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::backend("Failed to read directory entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }

        Ok(files)
    }

    /// Paths of every direct subdirectory of `dir`.
    async fn subdirs_of(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::backend("Failed to read directory", e)),
        };

        let mut dirs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::backend("Failed to read directory entry", e))?
        {
            if entry.file_type().await.is_ok_and(|ft| ft.is_dir()) {
                dirs.push(entry.path());
            }
        }

        Ok(dirs)
    }

    /// Count stored chapters per target in one pass over the chapter files.
    ///
    /// Every stored chapter carries its original text, even when it has no
    /// paragraphs, so it always counts toward [`CountTarget::Original`].
    async fn tally_chapters(
        &self,
        novel: &NovelKey,
        targets: &[CountTarget],
    ) -> Result<Vec<(CountTarget, u32)>> {
        let mut counts: Vec<(CountTarget, u32)> = targets.iter().map(|t| (*t, 0)).collect();
        for path in self.json_files_in(&self.get_chapters_dir(novel)).await? {
            let doc: Option<ChapterDocument> = self.read_json(&path).await?;
            let Some(doc) = doc else { continue };

            for (target, count) in counts.iter_mut() {
                let has_text = match target {
                    CountTarget::Original => true,
                    CountTarget::Translator(t) => doc.chapter.has_translation(*t),
                };
                if has_text {
                    *count += 1;
                }
            }
        }

        Ok(counts)
    }
}

#[async_trait]
impl NovelStorage for FilesystemStorage {
    async fn insert_novel(&self, novel: &Novel) -> Result<()> {
        let key = novel.key();
        self.validate_key(&key)?;

        if novel.title_jp.trim().is_empty() {
            return Err(StorageError::InvalidData {
                message: "Novel title cannot be empty".to_string(),
                source: None,
            });
        }

        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        if fs::try_exists(self.get_novel_file(&key))
            .await
            .map_err(|e| StorageError::backend("Failed to check novel file", e))?
        {
            return Err(StorageError::NovelAlreadyExists {
                key: key.to_string(),
                source: None,
            });
        }

        self.write_novel(novel).await?;
        debug!("Inserted novel {}", key);
        Ok(())
    }

    async fn get_novel(&self, key: &NovelKey) -> Result<Option<Novel>> {
        self.validate_key(key)?;
        self.read_novel(key).await
    }

    async fn update_novel(&self, key: &NovelKey, update: NovelUpdate) -> Result<Novel> {
        self.validate_key(key)?;

        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let mut novel = self
            .read_novel(key)
            .await?
            .ok_or_else(|| StorageError::NovelNotFound {
                key: key.to_string(),
                source: None,
            })?;

        update.apply(&mut novel);
        self.write_novel(&novel).await?;

        Ok(novel)
    }

    async fn list_novels(&self, filter: &NovelFilter) -> Result<Vec<NovelSummary>> {
        let mut summaries = Vec::new();

        for provider_dir in self.subdirs_of(&self.root_path.join("novels")).await? {
            for novel_dir in self.subdirs_of(&provider_dir).await? {
                let doc: Option<NovelDocument> =
                    self.read_json(&novel_dir.join("novel.json")).await?;
                if let Some(doc) = doc {
                    if filter.matches(&doc.novel) {
                        summaries.push(NovelSummary::from(&doc.novel));
                    }
                }
            }
        }

        // Most recently updated first, like a "latest updates" listing
        summaries.sort_by(|a, b| b.update_at.cmp(&a.update_at));

        Ok(summaries)
    }

    async fn insert_chapter(&self, chapter: &Chapter) -> Result<()> {
        let key = chapter.key();
        self.validate_key(&key.novel)?;

        if key.chapter_id.trim().is_empty() {
            return Err(StorageError::InvalidData {
                message: "Chapter id cannot be empty".to_string(),
                source: None,
            });
        }

        let lock = self.lock_for(&key.novel);
        let _guard = lock.lock().await;

        if fs::try_exists(self.get_chapter_file(&key))
            .await
            .map_err(|e| StorageError::backend("Failed to check chapter file", e))?
        {
            return Err(StorageError::ChapterAlreadyExists {
                key: key.to_string(),
                source: None,
            });
        }

        self.write_chapter(chapter).await
    }

    async fn get_chapter(&self, key: &ChapterKey) -> Result<Option<Chapter>> {
        self.validate_key(&key.novel)?;
        self.read_chapter(key).await
    }

    async fn put_chapter(&self, chapter: &Chapter) -> Result<()> {
        let key = chapter.key();
        self.validate_key(&key.novel)?;

        let lock = self.lock_for(&key.novel);
        let _guard = lock.lock().await;

        self.write_chapter(chapter).await
    }

    async fn set_translation(
        &self,
        key: &ChapterKey,
        translator: Translator,
        slot: TranslationSlot,
    ) -> Result<Chapter> {
        self.validate_key(&key.novel)?;

        let lock = self.lock_for(&key.novel);
        let _guard = lock.lock().await;

        let mut chapter =
            self.read_chapter(key)
                .await?
                .ok_or_else(|| StorageError::ChapterNotFound {
                    key: key.to_string(),
                    source: None,
                })?;

        chapter.translations.insert(translator, slot);
        self.write_chapter(&chapter).await?;

        Ok(chapter)
    }

    async fn count_chapters(&self, novel: &NovelKey, target: CountTarget) -> Result<u32> {
        self.validate_key(novel)?;

        let counts = self.tally_chapters(novel, &[target]).await?;
        Ok(counts.first().map_or(0, |(_, count)| *count))
    }

    async fn recount_novel(
        &self,
        key: &NovelKey,
        targets: &[CountTarget],
        change_at: DateTime<Utc>,
    ) -> Result<Novel> {
        self.validate_key(key)?;

        // Chapter writers take the same lock, so the tally is what gets stored.
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let mut novel = self
            .read_novel(key)
            .await?
            .ok_or_else(|| StorageError::NovelNotFound {
                key: key.to_string(),
                source: None,
            })?;

        let update = NovelUpdate {
            counts: self.tally_chapters(key, targets).await?,
            change_at: Some(change_at),
            ..Default::default()
        };
        update.apply(&mut novel);
        self.write_novel(&novel).await?;

        Ok(novel)
    }

    async fn append_merge_history(&self, entry: &TocMergeHistoryEntry) -> Result<()> {
        self.write_json(&self.get_merge_history_file(&entry.id), entry)
            .await
    }

    async fn list_merge_history(
        &self,
        novel: Option<&NovelKey>,
    ) -> Result<Vec<TocMergeHistoryEntry>> {
        let mut entries = Vec::new();

        for path in self.json_files_in(&self.merge_history_dir()).await? {
            let entry: Option<TocMergeHistoryEntry> = self.read_json(&path).await?;
            if let Some(entry) = entry {
                if novel.is_none_or(|key| entry.novel == *key) {
                    entries.push(entry);
                }
            }
        }

        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn get_merge_history(&self, id: &Uuid) -> Result<Option<TocMergeHistoryEntry>> {
        self.read_json(&self.get_merge_history_file(id)).await
    }

    async fn delete_merge_history(&self, id: &Uuid) -> Result<bool> {
        match fs::remove_file(self.get_merge_history_file(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::backend("Failed to delete history entry", e)),
        }
    }

    async fn append_patch(&self, entry: &PatchEntry) -> Result<()> {
        self.validate_key(&entry.novel)?;

        let lock = self.lock_for(&entry.novel);
        let _guard = lock.lock().await;

        let path = self.get_patches_file(&entry.novel);
        let mut patches: Vec<PatchEntry> = self.read_json(&path).await?.unwrap_or_default();
        patches.push(entry.clone());

        self.write_json(&path, &patches).await
    }

    async fn list_patches(&self, novel: &NovelKey) -> Result<Vec<PatchEntry>> {
        self.validate_key(novel)?;

        let mut patches: Vec<PatchEntry> = self
            .read_json(&self.get_patches_file(novel))
            .await?
            .unwrap_or_default();
        patches.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(patches)
    }

    async fn clear_patches(&self, novel: &NovelKey) -> Result<()> {
        self.validate_key(novel)?;

        let lock = self.lock_for(novel);
        let _guard = lock.lock().await;

        match fs::remove_file(self.get_patches_file(novel)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::backend("Failed to delete patch log", e)),
        }
    }
}
