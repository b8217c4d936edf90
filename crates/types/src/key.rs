//! Identity keys for persisted records.

use serde::{Deserialize, Serialize};

/// Compound key of a novel: the provider it was scraped from and the
/// provider's own opaque identifier for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NovelKey {
    pub provider_id: String,
    pub novel_id: String,
}

impl NovelKey {
    pub fn new(provider_id: impl Into<String>, novel_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            novel_id: novel_id.into(),
        }
    }

    /// Key of a chapter belonging to this novel.
    pub fn chapter(&self, chapter_id: impl Into<String>) -> ChapterKey {
        ChapterKey {
            novel: self.clone(),
            chapter_id: chapter_id.into(),
        }
    }
}

impl std::fmt::Display for NovelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider_id, self.novel_id)
    }
}

/// Key of a single chapter: (provider, novel, chapter).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterKey {
    pub novel: NovelKey,
    pub chapter_id: String,
}

impl ChapterKey {
    pub fn new(
        provider_id: impl Into<String>,
        novel_id: impl Into<String>,
        chapter_id: impl Into<String>,
    ) -> Self {
        NovelKey::new(provider_id, novel_id).chapter(chapter_id)
    }
}

impl std::fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.novel, self.chapter_id)
    }
}
