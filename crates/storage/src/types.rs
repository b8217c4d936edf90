//! Supporting types for the storage system.

use chrono::{DateTime, Utc};
use novella_types::{CountTarget, Field, Glossary, Novel, NovelKey, NovelType, TocItem};
use serde::{Deserialize, Serialize};

/// A partial update of a stored novel, applied atomically by the backend.
///
/// `None`/[`Field::Unset`] leaves the stored value untouched. Nullable fields
/// use [`Field`] so they can be explicitly cleared.
///
/// `toc_titles` sets the translated title of every TOC item with a matching
/// original title. It runs after `toc` against the TOC read under the lock,
/// so a title correction never replaces the TOC structure.
#[derive(Debug, Clone, Default)]
pub struct NovelUpdate {
    pub title_jp: Option<String>,
    pub title_zh: Field<String>,
    pub novel_type: Option<NovelType>,
    pub attentions: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub points: Field<u64>,
    pub total_characters: Field<u64>,
    pub introduction_jp: Option<String>,
    pub introduction_zh: Field<String>,
    pub glossary: Option<Glossary>,
    pub glossary_id: Option<String>,
    pub toc: Option<Vec<TocItem>>,
    pub toc_titles: Vec<(String, Field<String>)>,
    pub counts: Vec<(CountTarget, u32)>,
    pub visited_delta: u64,
    pub pause_update: Option<bool>,
    pub sync_at: Option<DateTime<Utc>>,
    pub change_at: Option<DateTime<Utc>>,
    pub update_at: Option<DateTime<Utc>>,
}

impl NovelUpdate {
    pub fn apply(self, novel: &mut Novel) {
        if let Some(title_jp) = self.title_jp {
            novel.title_jp = title_jp;
        }
        self.title_zh.apply_to(&mut novel.title_zh);
        if let Some(novel_type) = self.novel_type {
            novel.novel_type = novel_type;
        }
        if let Some(attentions) = self.attentions {
            novel.attentions = attentions;
        }
        if let Some(keywords) = self.keywords {
            novel.keywords = keywords;
        }
        self.points.apply_to(&mut novel.points);
        self.total_characters.apply_to(&mut novel.total_characters);
        if let Some(introduction_jp) = self.introduction_jp {
            novel.introduction_jp = introduction_jp;
        }
        self.introduction_zh.apply_to(&mut novel.introduction_zh);
        if let Some(glossary) = self.glossary {
            novel.glossary = glossary;
        }
        if let Some(glossary_id) = self.glossary_id {
            novel.glossary_id = glossary_id;
        }
        if let Some(toc) = self.toc {
            novel.toc = toc;
        }
        for (title_jp, title_zh) in self.toc_titles {
            for item in novel.toc.iter_mut().filter(|item| item.title_jp == title_jp) {
                title_zh.clone().apply_to(&mut item.title_zh);
            }
        }
        for (target, value) in self.counts {
            novel.counts.set(target, value);
        }
        novel.visited = novel.visited.saturating_add(self.visited_delta);
        if let Some(pause_update) = self.pause_update {
            novel.pause_update = pause_update;
        }
        if let Some(sync_at) = self.sync_at {
            novel.sync_at = sync_at;
        }
        if let Some(change_at) = self.change_at {
            novel.change_at = change_at;
        }
        if let Some(update_at) = self.update_at {
            novel.update_at = update_at;
        }
    }
}

/// Filter criteria for listing novels.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NovelFilter {
    pub provider_ids: Vec<String>,
    pub title_contains: Option<String>,
}

impl NovelFilter {
    pub fn matches(&self, novel: &Novel) -> bool {
        if !self.provider_ids.is_empty() && !self.provider_ids.contains(&novel.provider_id) {
            return false;
        }

        if let Some(ref needle) = self.title_contains {
            let needle = needle.to_lowercase();
            let in_jp = novel.title_jp.to_lowercase().contains(&needle);
            let in_zh = novel
                .title_zh
                .as_ref()
                .is_some_and(|t| t.to_lowercase().contains(&needle));
            if !in_jp && !in_zh {
                return false;
            }
        }

        true
    }
}

/// Lightweight summary of a novel for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovelSummary {
    pub key: NovelKey,
    pub title_jp: String,
    pub title_zh: Option<String>,
    pub total_chapters: u32,
    pub jp_chapters: u32,
    pub update_at: DateTime<Utc>,
}

impl From<&Novel> for NovelSummary {
    fn from(novel: &Novel) -> Self {
        Self {
            key: novel.key(),
            title_jp: novel.title_jp.clone(),
            title_zh: novel.title_zh.clone(),
            total_chapters: novel.toc_chapter_count() as u32,
            jp_chapters: novel.counts.jp,
            update_at: novel.update_at,
        }
    }
}
