//! Per-engine translation progress.
//!
//! Completion counters on the novel are always recomputed from the chapter
//! records, never incremented, so they cannot drift from what is stored.

use chrono::Utc;
use novella_types::{
    Chapter, ChapterKey, CountTarget, NovelKey, TranslationCounts, TranslationSlot,
    TranslationState, Translator,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::library::Library;

impl Library {
    /// Store one engine's translation of a chapter and refresh that engine's
    /// completion counter.
    ///
    /// `glossary_id` is the glossary version the client translated with; it
    /// must be the novel's current one.
    ///
    /// # Returns
    /// The recomputed number of chapters translated by `translator`
    pub async fn record_translation(
        &self,
        key: &ChapterKey,
        translator: Translator,
        glossary_id: &str,
        paragraphs: Vec<String>,
    ) -> Result<u32> {
        let novel = self.get_novel(&key.novel).await?;
        if novel.glossary_id != glossary_id {
            return Err(Error::Conflict(format!(
                "glossary of {} changed (translated with {}, current is {})",
                key.novel, glossary_id, novel.glossary_id
            )));
        }

        let chapter = self
            .storage
            .get_chapter(key)
            .await?
            .ok_or_else(|| Error::not_found("Chapter", key))?;
        if chapter.paragraphs.len() != paragraphs.len() {
            return Err(Error::Validation(format!(
                "translation has {} paragraphs, original has {}",
                paragraphs.len(),
                chapter.paragraphs.len()
            )));
        }

        let slot = TranslationSlot {
            paragraphs,
            glossary_id: novel.glossary_id,
            glossary: novel.glossary,
        };
        self.storage.set_translation(key, translator, slot).await?;

        self.update_count(&key.novel, CountTarget::Translator(translator))
            .await
    }

    /// Store a chapter fetched from its provider for the first time and
    /// refresh the original-language counter.
    ///
    /// Fails with [`Error::Conflict`] if the chapter is already stored.
    pub async fn record_fetched_chapter(&self, chapter: &Chapter) -> Result<u32> {
        self.storage.insert_chapter(chapter).await?;
        self.update_count(&chapter.key().novel, CountTarget::Original)
            .await
    }

    /// Recompute every counter of a novel from its chapter records.
    pub async fn recount(&self, key: &NovelKey) -> Result<TranslationCounts> {
        let targets: Vec<CountTarget> = std::iter::once(CountTarget::Original)
            .chain(Translator::ALL.into_iter().map(CountTarget::Translator))
            .collect();

        let novel = self
            .storage
            .recount_novel(key, &targets, Utc::now())
            .await?;
        self.reindex(&novel).await;

        Ok(novel.counts)
    }

    /// Whether a chapter's translation by `translator` is missing, current,
    /// or was produced under an outdated glossary.
    pub async fn translation_state(
        &self,
        key: &ChapterKey,
        translator: Translator,
    ) -> Result<TranslationState> {
        let novel = self.get_novel(&key.novel).await?;
        let chapter = self
            .storage
            .get_chapter(key)
            .await?
            .ok_or_else(|| Error::not_found("Chapter", key))?;

        Ok(chapter.translation_state(translator, &novel.glossary_id))
    }

    /// Recount one target and persist it.
    ///
    /// Progress is not new content: `change_at` moves, `update_at` does not.
    async fn update_count(&self, key: &NovelKey, target: CountTarget) -> Result<u32> {
        let novel = self
            .storage
            .recount_novel(key, &[target], Utc::now())
            .await?;
        let count = novel.counts.get(target);
        debug!("Counter {} of {} is now {}", target, key, count);

        self.reindex(&novel).await;
        Ok(count)
    }
}
