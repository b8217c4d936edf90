//! Novel level metadata and table of contents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::key::NovelKey;
use crate::translator::TranslationCounts;

/// Source-language term to fixed translation.
pub type Glossary = BTreeMap<String, String>;

/// Publication state of a novel as declared by its provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NovelType {
    #[default]
    Ongoing,
    Completed,
    ShortStory,
}

/// One entry of a table of contents.
///
/// Entries without a `chapter_id` are structural headings (volume titles and
/// the like) rather than readable chapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocItem {
    pub title_jp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_zh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_at: Option<DateTime<Utc>>,
}

impl TocItem {
    /// A chapter entry.
    pub fn chapter(title_jp: impl Into<String>, chapter_id: impl Into<String>) -> Self {
        Self {
            title_jp: title_jp.into(),
            title_zh: None,
            chapter_id: Some(chapter_id.into()),
            create_at: None,
        }
    }

    /// A structural heading.
    pub fn heading(title_jp: impl Into<String>) -> Self {
        Self {
            title_jp: title_jp.into(),
            title_zh: None,
            chapter_id: None,
            create_at: None,
        }
    }

    pub fn with_title_zh(mut self, title_zh: impl Into<String>) -> Self {
        self.title_zh = Some(title_zh.into());
        self
    }

    pub fn is_chapter(&self) -> bool {
        self.chapter_id.is_some()
    }
}

/// Metadata as returned by a provider adapter, before it is merged with
/// anything already stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteMetadata {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, rename = "type")]
    pub novel_type: NovelType,
    #[serde(default)]
    pub attentions: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub points: Option<u64>,
    #[serde(default)]
    pub total_characters: Option<u64>,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub toc: Vec<TocItem>,
}

/// A stored novel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Novel {
    pub provider_id: String,
    pub novel_id: String,
    pub title_jp: String,
    #[serde(default)]
    pub title_zh: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(rename = "type")]
    pub novel_type: NovelType,
    #[serde(default)]
    pub attentions: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub points: Option<u64>,
    #[serde(default)]
    pub total_characters: Option<u64>,
    pub introduction_jp: String,
    #[serde(default)]
    pub introduction_zh: Option<String>,
    #[serde(default)]
    pub glossary: Glossary,
    pub glossary_id: String,
    pub toc: Vec<TocItem>,
    #[serde(default)]
    pub counts: TranslationCounts,
    #[serde(default)]
    pub visited: u64,
    #[serde(default)]
    pub pause_update: bool,
    /// Last time remote metadata was checked.
    pub sync_at: DateTime<Utc>,
    /// Last time stored content changed in any way.
    pub change_at: DateTime<Utc>,
    /// Last time a change visible to readers happened.
    pub update_at: DateTime<Utc>,
}

impl Novel {
    /// Build a fresh record from a first successful remote fetch.
    pub fn from_remote(
        key: &NovelKey,
        remote: RemoteMetadata,
        glossary_id: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            provider_id: key.provider_id.clone(),
            novel_id: key.novel_id.clone(),
            title_jp: remote.title,
            title_zh: None,
            authors: remote.authors,
            novel_type: remote.novel_type,
            attentions: remote.attentions,
            keywords: remote.keywords,
            points: remote.points,
            total_characters: remote.total_characters,
            introduction_jp: remote.introduction,
            introduction_zh: None,
            glossary: Glossary::new(),
            glossary_id,
            toc: remote.toc,
            counts: TranslationCounts::default(),
            visited: 0,
            pause_update: false,
            sync_at: now,
            change_at: now,
            update_at: now,
        }
    }

    pub fn key(&self) -> NovelKey {
        NovelKey::new(&self.provider_id, &self.novel_id)
    }

    /// Number of readable chapters in the table of contents.
    pub fn toc_chapter_count(&self) -> usize {
        self.toc.iter().filter(|item| item.is_chapter()).count()
    }
}
