//! Search index collaborator.
//!
//! The library only pushes documents; querying belongs to whoever runs the
//! index. [`MemorySearchIndex`] is a process-local index for the command line
//! client and for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use novella_types::{Novel, NovelKey, NovelType, TranslationCounts};
use serde::Serialize;

use crate::error::CollaboratorError;

/// The indexed projection of a novel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NovelDocument {
    pub key: NovelKey,
    pub title_jp: String,
    pub title_zh: Option<String>,
    pub authors: Vec<String>,
    pub novel_type: NovelType,
    pub attentions: Vec<String>,
    pub keywords: Vec<String>,
    pub points: Option<u64>,
    pub total_characters: Option<u64>,
    pub counts: TranslationCounts,
    pub visited: u64,
    pub update_at: DateTime<Utc>,
}

impl From<&Novel> for NovelDocument {
    fn from(novel: &Novel) -> Self {
        Self {
            key: novel.key(),
            title_jp: novel.title_jp.clone(),
            title_zh: novel.title_zh.clone(),
            authors: novel.authors.clone(),
            novel_type: novel.novel_type,
            attentions: novel.attentions.clone(),
            keywords: novel.keywords.clone(),
            points: novel.points,
            total_characters: novel.total_characters,
            counts: novel.counts.clone(),
            visited: novel.visited,
            update_at: novel.update_at,
        }
    }
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Replace the indexed document for the novel.
    async fn index(&self, document: &NovelDocument) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Default)]
pub struct MemorySearchIndex {
    documents: DashMap<NovelKey, NovelDocument>,
}

impl MemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &NovelKey) -> Option<NovelDocument> {
        self.documents.get(key).map(|doc| doc.clone())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Case-insensitive match on titles and keywords, most recently updated first.
    pub fn search(&self, query: &str) -> Vec<NovelDocument> {
        let query = query.to_lowercase();
        let mut hits: Vec<NovelDocument> = self
            .documents
            .iter()
            .filter(|doc| {
                doc.title_jp.to_lowercase().contains(&query)
                    || doc
                        .title_zh
                        .as_ref()
                        .is_some_and(|t| t.to_lowercase().contains(&query))
                    || doc.keywords.iter().any(|k| k.to_lowercase() == query)
            })
            .map(|doc| doc.clone())
            .collect();

        hits.sort_by(|a, b| b.update_at.cmp(&a.update_at));
        hits
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn index(&self, document: &NovelDocument) -> Result<(), CollaboratorError> {
        self.documents.insert(document.key.clone(), document.clone());
        Ok(())
    }
}
