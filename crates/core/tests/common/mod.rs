#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use novella_core::{
    Library, LibraryOptions, Provider, ProviderCapabilities, ProviderError, ProviderRegistry,
    RankItem, RankOptions, RemoteChapter,
};
use novella_storage::FilesystemStorage;
use novella_types::{RemoteMetadata, TocItem};
use tempfile::TempDir;

pub const PROVIDER: &str = "mock";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Serve,
    Fail,
    Hang,
}

/// Provider serving scripted metadata and counting every call.
pub struct MockProvider {
    capabilities: ProviderCapabilities,
    metadata: Mutex<HashMap<String, RemoteMetadata>>,
    chapters: Mutex<HashMap<(String, String), Vec<String>>>,
    behavior: Mutex<Behavior>,
    pub calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(capabilities: ProviderCapabilities) -> Self {
        Self {
            capabilities,
            metadata: Mutex::new(HashMap::new()),
            chapters: Mutex::new(HashMap::new()),
            behavior: Mutex::new(Behavior::Serve),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_metadata(&self, novel_id: &str, metadata: RemoteMetadata) {
        self.metadata
            .lock()
            .unwrap()
            .insert(novel_id.to_string(), metadata);
    }

    pub fn set_chapter(&self, novel_id: &str, chapter_id: &str, paragraphs: &[&str]) {
        self.chapters.lock().unwrap().insert(
            (novel_id.to_string(), chapter_id.to_string()),
            paragraphs.iter().map(|p| p.to_string()).collect(),
        );
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            Behavior::Serve => Ok(()),
            Behavior::Fail => Err(ProviderError::fetch("provider unavailable")),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn id(&self) -> &str {
        PROVIDER
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    async fn get_metadata(&self, novel_id: &str) -> Result<RemoteMetadata, ProviderError> {
        self.enter().await?;
        self.metadata
            .lock()
            .unwrap()
            .get(novel_id)
            .cloned()
            .ok_or_else(|| ProviderError::fetch(format!("no novel {}", novel_id)))
    }

    async fn get_chapter(
        &self,
        novel_id: &str,
        chapter_id: &str,
    ) -> Result<RemoteChapter, ProviderError> {
        self.enter().await?;
        self.chapters
            .lock()
            .unwrap()
            .get(&(novel_id.to_string(), chapter_id.to_string()))
            .cloned()
            .map(|paragraphs| RemoteChapter { paragraphs })
            .ok_or_else(|| ProviderError::fetch(format!("no chapter {}", chapter_id)))
    }

    async fn get_rank(&self, options: &RankOptions) -> Result<Vec<RankItem>, ProviderError> {
        self.enter().await?;
        let metadata = self.metadata.lock().unwrap();
        let mut items: Vec<RankItem> = metadata
            .iter()
            .map(|(novel_id, m)| RankItem {
                novel_id: novel_id.clone(),
                title: m.title.clone(),
                attentions: m.attentions.clone(),
                keywords: m.keywords.clone(),
                extra: options.list.clone(),
            })
            .collect();
        items.sort_by(|a, b| a.novel_id.cmp(&b.novel_id));
        Ok(items)
    }
}

pub fn metadata(title: &str, toc: &[(&str, &str)]) -> RemoteMetadata {
    RemoteMetadata {
        title: title.to_string(),
        authors: vec!["作者".to_string()],
        introduction: "あらすじ".to_string(),
        toc: toc
            .iter()
            .map(|(title, id)| TocItem::chapter(*title, *id))
            .collect(),
        ..Default::default()
    }
}

pub struct Fixture {
    pub library: Library,
    pub provider: Arc<MockProvider>,
    pub storage: Arc<FilesystemStorage>,
    _dir: TempDir,
}

pub fn fixture(capabilities: ProviderCapabilities) -> Fixture {
    fixture_with(capabilities, |library| library)
}

pub fn fixture_with(
    capabilities: ProviderCapabilities,
    configure: impl FnOnce(Library) -> Library,
) -> Fixture {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FilesystemStorage::new(dir.path()));
    let provider = Arc::new(MockProvider::new(capabilities));

    let library = Library::new(
        storage.clone(),
        ProviderRegistry::new().with(provider.clone()),
    )
    .with_options(LibraryOptions {
        fetch_timeout: Duration::from_millis(200),
        view_cooldown: Duration::from_secs(300),
    });

    Fixture {
        library: configure(library),
        provider,
        storage,
        _dir: dir,
    }
}
