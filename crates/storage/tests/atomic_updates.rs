//! Concurrent read-modify-write cycles on one novel must not lose updates.

use chrono::Utc;
use novella_storage::{FilesystemStorage, NovelStorage, NovelUpdate};
use novella_types::{
    Chapter, CountTarget, Glossary, Novel, NovelKey, RemoteMetadata, TocItem, TranslationSlot,
    Translator,
};
use tempfile::TempDir;

fn create_test_novel(key: &NovelKey) -> Novel {
    let remote = RemoteMetadata {
        title: "並行テスト".to_string(),
        introduction: "あらすじ".to_string(),
        toc: vec![TocItem::chapter("一話", "1")],
        ..Default::default()
    };
    Novel::from_remote(key, remote, "glossary".to_string(), Utc::now())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_visit_increments_are_not_lost() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FilesystemStorage::new(temp_dir.path());
    storage.initialize().await.unwrap();

    let key = NovelKey::new("syosetu", "n1234ab");
    storage.insert_novel(&create_test_novel(&key)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let storage = storage.clone();
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            storage
                .update_novel(
                    &key,
                    NovelUpdate {
                        visited_delta: 1,
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let novel = storage.get_novel(&key).await.unwrap().unwrap();
    assert_eq!(novel.visited, 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_chapter_inserts_admit_one_writer() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FilesystemStorage::new(temp_dir.path());
    storage.initialize().await.unwrap();

    let key = NovelKey::new("syosetu", "n1234ab").chapter("1");

    let mut handles = Vec::new();
    for i in 0..8 {
        let storage = storage.clone();
        let chapter = Chapter::new(&key, vec![format!("本文{i}")]);
        handles.push(tokio::spawn(
            async move { storage.insert_chapter(&chapter).await },
        ));
    }

    let mut inserted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => inserted += 1,
            Err(e) => assert!(e.is_already_exists()),
        }
    }

    assert_eq!(inserted, 1);
    assert!(storage.get_chapter(&key).await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_recounts_store_the_final_count() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FilesystemStorage::new(temp_dir.path());
    storage.initialize().await.unwrap();

    let key = NovelKey::new("syosetu", "n1234ab");
    storage.insert_novel(&create_test_novel(&key)).await.unwrap();
    for i in 0..8 {
        storage
            .insert_chapter(&Chapter::new(&key.chapter(i.to_string()), vec!["本文".to_string()]))
            .await
            .unwrap();
    }

    let target = CountTarget::Translator(Translator::Gpt);
    let mut handles = Vec::new();
    for i in 0..8 {
        let storage = storage.clone();
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            let slot = TranslationSlot {
                paragraphs: vec!["text".to_string()],
                glossary_id: "glossary".to_string(),
                glossary: Glossary::new(),
            };
            storage
                .set_translation(&key.chapter(i.to_string()), Translator::Gpt, slot)
                .await
                .unwrap();
            storage
                .recount_novel(&key, &[target], Utc::now())
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let novel = storage.get_novel(&key).await.unwrap().unwrap();
    assert_eq!(novel.counts.get(target), 8);
    assert_eq!(storage.count_chapters(&key, target).await.unwrap(), 8);
}
