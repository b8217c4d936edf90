//! Chapter text and per-engine translations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::key::ChapterKey;
use crate::novel::Glossary;
use crate::translator::Translator;

/// One engine's translation of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSlot {
    pub paragraphs: Vec<String>,
    /// Glossary version of the novel when this translation was produced.
    pub glossary_id: String,
    /// Glossary in effect when this translation was produced.
    #[serde(default)]
    pub glossary: Glossary,
}

/// Whether a chapter's translation from one engine is usable as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationState {
    /// No translation from this engine.
    Missing,
    /// Translated under the novel's current glossary.
    Current,
    /// Translated under an older glossary; eligible for re-translation.
    Expired,
}

/// A stored chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub provider_id: String,
    pub novel_id: String,
    pub chapter_id: String,
    pub paragraphs: Vec<String>,
    /// Engines without an entry have not translated this chapter.
    #[serde(default)]
    pub translations: BTreeMap<Translator, TranslationSlot>,
}

impl Chapter {
    pub fn new(key: &ChapterKey, paragraphs: Vec<String>) -> Self {
        Self {
            provider_id: key.novel.provider_id.clone(),
            novel_id: key.novel.novel_id.clone(),
            chapter_id: key.chapter_id.clone(),
            paragraphs,
            translations: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> ChapterKey {
        ChapterKey::new(&self.provider_id, &self.novel_id, &self.chapter_id)
    }

    pub fn translation(&self, translator: Translator) -> Option<&TranslationSlot> {
        self.translations.get(&translator)
    }

    /// True when the given engine has produced a translation, stale or not.
    pub fn has_translation(&self, translator: Translator) -> bool {
        self.translations.contains_key(&translator)
    }

    pub fn translation_state(
        &self,
        translator: Translator,
        current_glossary_id: &str,
    ) -> TranslationState {
        match self.translations.get(&translator) {
            None => TranslationState::Missing,
            Some(slot) if slot.glossary_id == current_glossary_id => TranslationState::Current,
            Some(_) => TranslationState::Expired,
        }
    }

    pub fn is_expired(&self, translator: Translator, current_glossary_id: &str) -> bool {
        self.translation_state(translator, current_glossary_id) == TranslationState::Expired
    }
}
