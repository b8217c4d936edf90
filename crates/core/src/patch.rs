//! Human corrections of translated text, and their revocation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use novella_storage::NovelUpdate;
use novella_types::{Field, Novel, NovelKey, NovelPatch, PatchEntry, TextChange, TocTextChange};
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::library::Library;

fn text_change(current: Option<&String>, field: &Field<String>) -> Option<TextChange> {
    if field.is_unset() {
        return None;
    }
    let after = field.resolve(current);
    (after.as_ref() != current).then(|| TextChange {
        before: current.cloned(),
        after,
    })
}

/// Diff a patch against the stored novel; fields that would not change are
/// left out of the entry.
fn diff_patch(novel: &Novel, patch: &NovelPatch, now: DateTime<Utc>) -> PatchEntry {
    let toc = patch
        .toc
        .iter()
        .filter_map(|(title_jp, field)| {
            let item = novel.toc.iter().find(|item| item.title_jp == *title_jp)?;
            let change = text_change(item.title_zh.as_ref(), field)?;
            Some(TocTextChange {
                title_jp: title_jp.clone(),
                before: change.before,
                after: change.after,
            })
        })
        .collect();

    PatchEntry {
        id: Uuid::new_v4(),
        novel: novel.key(),
        created_at: now,
        title_zh: text_change(novel.title_zh.as_ref(), &patch.title_zh),
        introduction_zh: text_change(novel.introduction_zh.as_ref(), &patch.introduction_zh),
        toc,
    }
}

/// Text to restore when revoking a novel's patches.
#[derive(Debug, Default, PartialEq, Eq)]
struct Restore<'a> {
    title_zh: Option<Option<String>>,
    introduction_zh: Option<Option<String>>,
    toc: HashMap<&'a str, Option<String>>,
}

/// Walk patches newest to oldest so the oldest recorded `before` of each
/// field is what remains.
fn fold_restore(patches: &[PatchEntry]) -> Restore<'_> {
    patches.iter().rev().fold(Restore::default(), |mut acc, patch| {
        if let Some(change) = &patch.title_zh {
            acc.title_zh = Some(change.before.clone());
        }
        if let Some(change) = &patch.introduction_zh {
            acc.introduction_zh = Some(change.before.clone());
        }
        for change in &patch.toc {
            acc.toc
                .insert(change.title_jp.as_str(), change.before.clone());
        }
        acc
    })
}

impl Library {
    /// Apply a human correction to a novel's translated text.
    ///
    /// # Returns
    /// The recorded patch, or `None` when nothing would change
    pub async fn apply_patch(&self, key: &NovelKey, patch: NovelPatch) -> Result<Option<PatchEntry>> {
        let novel = self.get_novel(key).await?;
        let now = Utc::now();

        let entry = diff_patch(&novel, &patch, now);
        if entry.is_empty() {
            return Ok(None);
        }

        self.storage.append_patch(&entry).await?;

        let update = NovelUpdate {
            title_zh: entry
                .title_zh
                .as_ref()
                .map(|c| Field::from(c.after.clone()))
                .unwrap_or_default(),
            introduction_zh: entry
                .introduction_zh
                .as_ref()
                .map(|c| Field::from(c.after.clone()))
                .unwrap_or_default(),
            toc_titles: entry
                .toc
                .iter()
                .map(|change| (change.title_jp.clone(), Field::from(change.after.clone())))
                .collect(),
            change_at: Some(now),
            ..Default::default()
        };
        let updated = self.storage.update_novel(key, update).await?;
        self.reindex(&updated).await;

        info!("Applied patch {} to {}", entry.id, key);
        Ok(Some(entry))
    }

    /// Restore the translated text every recorded patch replaced, then drop
    /// the patch log.
    ///
    /// # Returns
    /// The number of patches revoked
    pub async fn revoke_patches(&self, key: &NovelKey) -> Result<usize> {
        self.get_novel(key).await?;
        let patches = self.storage.list_patches(key).await?;
        if patches.is_empty() {
            return Ok(0);
        }

        let restore = fold_restore(&patches);
        let update = NovelUpdate {
            title_zh: restore.title_zh.map(Field::from).unwrap_or_default(),
            introduction_zh: restore.introduction_zh.map(Field::from).unwrap_or_default(),
            toc_titles: restore
                .toc
                .into_iter()
                .map(|(title_jp, title_zh)| (title_jp.to_string(), Field::from(title_zh)))
                .collect(),
            change_at: Some(Utc::now()),
            ..Default::default()
        };
        let updated = self.storage.update_novel(key, update).await?;
        self.storage.clear_patches(key).await?;
        self.reindex(&updated).await;

        info!("Revoked {} patches of {}", patches.len(), key);
        Ok(patches.len())
    }
}
