mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{PROVIDER, fixture, metadata};
use novella_core::{Error, Library, ProviderCapabilities, ProviderRegistry};
use novella_storage::{FilesystemStorage, NovelFilter, NovelStorage, NovelSummary, NovelUpdate};
use novella_types::{
    Chapter, ChapterKey, CountTarget, Field, Novel, NovelKey, NovelPatch, PatchEntry,
    TocItem, TocMergeHistoryEntry, TranslationSlot, Translator,
};
use tempfile::TempDir;
use uuid::Uuid;

const DAY: Duration = Duration::from_secs(24 * 3600);

fn key() -> NovelKey {
    NovelKey::new(PROVIDER, "n1")
}

async fn seeded() -> common::Fixture {
    let f = fixture(ProviderCapabilities::default());
    f.provider
        .set_metadata("n1", metadata("題名", &[("一話", "1"), ("二話", "2")]));
    f.library.get_or_refresh(&key(), DAY).await.unwrap();
    f
}

fn title(value: &str) -> NovelPatch {
    NovelPatch {
        title_zh: Field::Value(value.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_patch_records_replaced_text() {
    let f = seeded().await;

    let entry = f
        .library
        .apply_patch(
            &key(),
            NovelPatch {
                title_zh: Field::Value("标题".to_string()),
                toc: BTreeMap::from([("二話".to_string(), Field::Value("第二话".to_string()))]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    let title_change = entry.title_zh.unwrap();
    assert_eq!(title_change.before, None);
    assert_eq!(title_change.after.as_deref(), Some("标题"));
    assert_eq!(entry.toc.len(), 1);

    let novel = f.library.get_novel(&key()).await.unwrap();
    assert_eq!(novel.title_zh.as_deref(), Some("标题"));
    assert_eq!(novel.toc[1].title_zh.as_deref(), Some("第二话"));
    assert_eq!(novel.toc[0].title_zh, None);
    assert_eq!(f.storage.list_patches(&key()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_noop_patch_is_not_recorded() {
    let f = seeded().await;
    f.library.apply_patch(&key(), title("标题")).await.unwrap();

    let entry = f.library.apply_patch(&key(), title("标题")).await.unwrap();
    assert_eq!(entry, None);
    let entry = f
        .library
        .apply_patch(&key(), NovelPatch::default())
        .await
        .unwrap();
    assert_eq!(entry, None);
    assert_eq!(f.storage.list_patches(&key()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_revoke_restores_text_before_first_patch() {
    let f = seeded().await;
    f.library
        .apply_patch(
            &key(),
            NovelPatch {
                introduction_zh: Field::Value("简介".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    f.library.apply_patch(&key(), title("标题")).await.unwrap();
    f.library.apply_patch(&key(), title("新标题")).await.unwrap();
    f.library
        .apply_patch(
            &key(),
            NovelPatch {
                toc: BTreeMap::from([("一話".to_string(), Field::Value("第一话".to_string()))]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let revoked = f.library.revoke_patches(&key()).await.unwrap();
    assert_eq!(revoked, 4);

    let novel = f.library.get_novel(&key()).await.unwrap();
    assert_eq!(novel.title_zh, None);
    assert_eq!(novel.introduction_zh, None);
    assert!(novel.toc.iter().all(|item| item.title_zh.is_none()));
    assert!(f.storage.list_patches(&key()).await.unwrap().is_empty());

    assert_eq!(f.library.revoke_patches(&key()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_patch_of_missing_novel_is_not_found() {
    let f = seeded().await;
    let err = f
        .library
        .apply_patch(&NovelKey::new(PROVIDER, "missing"), title("标题"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { what: "Novel", .. }));
}

/// Storage that commits a refreshed TOC while a patch is being recorded,
/// the way a concurrent refresh would.
struct RefreshDuringPatch {
    inner: FilesystemStorage,
    refreshed_toc: Vec<TocItem>,
}

type StorageResult<T> = novella_storage::Result<T>;

#[async_trait]
impl NovelStorage for RefreshDuringPatch {
    async fn insert_novel(&self, novel: &Novel) -> StorageResult<()> {
        self.inner.insert_novel(novel).await
    }

    async fn get_novel(&self, key: &NovelKey) -> StorageResult<Option<Novel>> {
        self.inner.get_novel(key).await
    }

    async fn update_novel(&self, key: &NovelKey, update: NovelUpdate) -> StorageResult<Novel> {
        self.inner.update_novel(key, update).await
    }

    async fn list_novels(&self, filter: &NovelFilter) -> StorageResult<Vec<NovelSummary>> {
        self.inner.list_novels(filter).await
    }

    async fn insert_chapter(&self, chapter: &Chapter) -> StorageResult<()> {
        self.inner.insert_chapter(chapter).await
    }

    async fn get_chapter(&self, key: &ChapterKey) -> StorageResult<Option<Chapter>> {
        self.inner.get_chapter(key).await
    }

    async fn put_chapter(&self, chapter: &Chapter) -> StorageResult<()> {
        self.inner.put_chapter(chapter).await
    }

    async fn set_translation(
        &self,
        key: &ChapterKey,
        translator: Translator,
        slot: TranslationSlot,
    ) -> StorageResult<Chapter> {
        self.inner.set_translation(key, translator, slot).await
    }

    async fn count_chapters(&self, novel: &NovelKey, target: CountTarget) -> StorageResult<u32> {
        self.inner.count_chapters(novel, target).await
    }

    async fn recount_novel(
        &self,
        key: &NovelKey,
        targets: &[CountTarget],
        change_at: DateTime<Utc>,
    ) -> StorageResult<Novel> {
        self.inner.recount_novel(key, targets, change_at).await
    }

    async fn append_merge_history(&self, entry: &TocMergeHistoryEntry) -> StorageResult<()> {
        self.inner.append_merge_history(entry).await
    }

    async fn list_merge_history(
        &self,
        novel: Option<&NovelKey>,
    ) -> StorageResult<Vec<TocMergeHistoryEntry>> {
        self.inner.list_merge_history(novel).await
    }

    async fn get_merge_history(&self, id: &Uuid) -> StorageResult<Option<TocMergeHistoryEntry>> {
        self.inner.get_merge_history(id).await
    }

    async fn delete_merge_history(&self, id: &Uuid) -> StorageResult<bool> {
        self.inner.delete_merge_history(id).await
    }

    async fn append_patch(&self, entry: &PatchEntry) -> StorageResult<()> {
        self.inner.append_patch(entry).await?;
        self.inner
            .update_novel(
                &entry.novel,
                NovelUpdate {
                    toc: Some(self.refreshed_toc.clone()),
                    sync_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    async fn list_patches(&self, novel: &NovelKey) -> StorageResult<Vec<PatchEntry>> {
        self.inner.list_patches(novel).await
    }

    async fn clear_patches(&self, novel: &NovelKey) -> StorageResult<()> {
        self.inner.clear_patches(novel).await
    }
}

#[tokio::test]
async fn test_patch_keeps_toc_committed_by_concurrent_refresh() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(RefreshDuringPatch {
        inner: FilesystemStorage::new(dir.path()),
        refreshed_toc: vec![TocItem::chapter("一話", "1"), TocItem::chapter("二話", "2")],
    });
    let library = Library::new(storage.clone(), ProviderRegistry::new());

    let novel = Novel::from_remote(
        &key(),
        metadata("題名", &[("一話", "1")]),
        "glossary".to_string(),
        Utc::now(),
    );
    storage.insert_novel(&novel).await.unwrap();

    library
        .apply_patch(
            &key(),
            NovelPatch {
                toc: BTreeMap::from([("一話".to_string(), Field::Value("第一话".to_string()))]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    let stored = library.get_novel(&key()).await.unwrap();
    assert_eq!(stored.toc.len(), 2);
    assert_eq!(stored.toc[0].title_zh.as_deref(), Some("第一话"));
    assert_eq!(stored.toc[1].title_jp, "二話");
    assert_eq!(stored.toc[1].chapter_id.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_revoke_keeps_chapters_added_after_patch() {
    let f = seeded().await;
    f.library
        .apply_patch(
            &key(),
            NovelPatch {
                toc: BTreeMap::from([("一話".to_string(), Field::Value("第一话".to_string()))]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut toc = f.library.get_novel(&key()).await.unwrap().toc;
    toc.push(TocItem::chapter("三話", "3"));
    f.storage
        .update_novel(
            &key(),
            NovelUpdate {
                toc: Some(toc),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    f.library.revoke_patches(&key()).await.unwrap();

    let novel = f.library.get_novel(&key()).await.unwrap();
    assert_eq!(novel.toc.len(), 3);
    assert_eq!(novel.toc[0].title_zh, None);
    assert_eq!(novel.toc[2].title_jp, "三話");
}
