//! Table of contents reconciliation.
//!
//! Each refresh produces a fresh TOC from the provider. [`merge_toc`] folds the
//! stored translations into it and decides two separate things:
//!
//! - whether readers should see the novel as updated (`has_changed`), and
//! - whether a moderator should look at the change (`review_reason`).
//!
//! Chapter additions are routine and only set `has_changed`. Deletions and
//! silent title rewrites are rare and suspicious, so they are flagged for review.

use std::collections::{HashMap, HashSet};

use novella_types::TocItem;
use serde::{Deserialize, Serialize};

/// Whether a provider keeps chapter identifiers stable across fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStability {
    /// A chapter id always refers to the same chapter.
    #[default]
    Stable,
    /// Chapter ids may be reassigned or reused between fetches.
    Unstable,
}

/// Why a merge needs human review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewReason {
    /// An unstable provider now reports fewer chapters than are stored.
    UnknownChaptersDeleted,
    /// A stable provider no longer lists some stored chapter ids.
    ChaptersDeleted,
    /// An unstable provider kept its chapter count but renamed a chapter.
    ChapterTitleChanged,
}

impl std::fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::UnknownChaptersDeleted => "unknown chapters were deleted",
            Self::ChaptersDeleted => "chapters were deleted",
            Self::ChapterTitleChanged => "chapter title changed",
        })
    }
}

/// Result of reconciling a remote TOC with the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The remote TOC, in remote order, carrying stored translations forward.
    pub toc: Vec<TocItem>,
    pub has_changed: bool,
    pub review_reason: Option<ReviewReason>,
}

/// Merge a freshly fetched TOC into the stored one.
pub fn merge_toc(remote: &[TocItem], local: &[TocItem], stability: IdStability) -> MergeOutcome {
    let toc = carry_translations(remote, local);

    let (has_changed, review_reason) = match stability {
        IdStability::Unstable => unstable_verdict(remote, local),
        IdStability::Stable => stable_verdict(remote, local),
    };

    MergeOutcome {
        toc,
        has_changed,
        review_reason,
    }
}

/// Copy translated titles onto remote items by exact original title.
///
/// Identity is the original title, not the chapter id, so translations
/// survive id reshuffles. With duplicate titles the first local item wins.
fn carry_translations(remote: &[TocItem], local: &[TocItem]) -> Vec<TocItem> {
    let mut by_title: HashMap<&str, &TocItem> = HashMap::with_capacity(local.len());
    for item in local {
        by_title.entry(item.title_jp.as_str()).or_insert(item);
    }

    remote
        .iter()
        .map(|item| {
            let translated = by_title
                .get(item.title_jp.as_str())
                .and_then(|local_item| local_item.title_zh.clone());

            match translated {
                Some(title_zh) => TocItem {
                    title_zh: Some(title_zh),
                    ..item.clone()
                },
                None => item.clone(),
            }
        })
        .collect()
}

fn chapter_titles(toc: &[TocItem]) -> HashMap<&str, &str> {
    toc.iter()
        .filter_map(|item| {
            item.chapter_id
                .as_deref()
                .map(|id| (id, item.title_jp.as_str()))
        })
        .collect()
}

fn chapter_ids(toc: &[TocItem]) -> HashSet<&str> {
    toc.iter()
        .filter_map(|item| item.chapter_id.as_deref())
        .collect()
}

fn unstable_verdict(remote: &[TocItem], local: &[TocItem]) -> (bool, Option<ReviewReason>) {
    let remote_chapters = chapter_titles(remote);
    let local_chapters = chapter_titles(local);

    if remote_chapters.len() < local_chapters.len() {
        // Ids cannot be diffed reliably here, so a shrinking TOC is the only
        // available signal of lost chapters.
        return (true, Some(ReviewReason::UnknownChaptersDeleted));
    }

    if remote_chapters.len() != local_chapters.len() {
        return (true, None);
    }

    let title_changed = remote_chapters.iter().any(|(id, title)| {
        local_chapters
            .get(id)
            .is_some_and(|local_title| local_title != title)
    });

    (false, title_changed.then_some(ReviewReason::ChapterTitleChanged))
}

fn stable_verdict(remote: &[TocItem], local: &[TocItem]) -> (bool, Option<ReviewReason>) {
    let remote_ids = chapter_ids(remote);
    let local_ids = chapter_ids(local);

    let has_changed = remote_ids != local_ids;
    let deleted = local_ids.iter().any(|id| !remote_ids.contains(id));

    (has_changed, deleted.then_some(ReviewReason::ChaptersDeleted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toc(items: &[(&str, &str)]) -> Vec<TocItem> {
        items
            .iter()
            .map(|(id, title)| TocItem::chapter(*title, *id))
            .collect()
    }

    fn abc() -> Vec<TocItem> {
        toc(&[("1", "A"), ("2", "B"), ("3", "C")])
    }

    #[test]
    fn test_merge_with_itself_is_unchanged() {
        let mut local = abc();
        local.insert(0, TocItem::heading("Volume 1").with_title_zh("第一卷"));
        local[1].title_zh = Some("甲".to_string());

        for stability in [IdStability::Stable, IdStability::Unstable] {
            let outcome = merge_toc(&local, &local, stability);
            assert_eq!(outcome.toc, local);
            assert!(!outcome.has_changed);
            assert_eq!(outcome.review_reason, None);
        }
    }

    #[test]
    fn test_translations_follow_titles_across_id_changes() {
        let local = vec![
            TocItem::chapter("A", "1").with_title_zh("甲"),
            TocItem::chapter("B", "2").with_title_zh("乙"),
        ];
        let remote = toc(&[("10", "B"), ("11", "A"), ("12", "C")]);

        let outcome = merge_toc(&remote, &local, IdStability::Unstable);

        assert_eq!(outcome.toc[0].title_zh.as_deref(), Some("乙"));
        assert_eq!(outcome.toc[0].chapter_id.as_deref(), Some("10"));
        assert_eq!(outcome.toc[1].title_zh.as_deref(), Some("甲"));
        assert_eq!(outcome.toc[2].title_zh, None);
    }

    #[test]
    fn test_merge_keeps_remote_order_and_untranslated_items() {
        let local = vec![TocItem::chapter("A", "1")];
        let remote = toc(&[("2", "B"), ("1", "A")]);

        let outcome = merge_toc(&remote, &local, IdStability::Stable);
        assert_eq!(outcome.toc, remote);
    }

    #[test]
    fn test_duplicate_titles_take_first_local_match() {
        let local = vec![
            TocItem::heading("挿絵").with_title_zh("插图一"),
            TocItem::heading("挿絵").with_title_zh("插图二"),
        ];
        let remote = vec![TocItem::heading("挿絵"), TocItem::heading("挿絵")];

        let outcome = merge_toc(&remote, &local, IdStability::Stable);
        assert_eq!(outcome.toc[0].title_zh.as_deref(), Some("插图一"));
        assert_eq!(outcome.toc[1].title_zh.as_deref(), Some("插图一"));
    }

    #[test]
    fn test_first_match_without_translation_is_not_skipped() {
        let local = vec![
            TocItem::heading("挿絵"),
            TocItem::heading("挿絵").with_title_zh("插图"),
        ];
        let remote = vec![TocItem::heading("挿絵")];

        let outcome = merge_toc(&remote, &local, IdStability::Stable);
        assert_eq!(outcome.toc[0].title_zh, None);
    }

    #[test]
    fn test_stable_title_edit_is_not_a_change() {
        let remote = toc(&[("1", "A2"), ("2", "B"), ("3", "C")]);

        let outcome = merge_toc(&remote, &abc(), IdStability::Stable);
        assert!(!outcome.has_changed);
        assert_eq!(outcome.review_reason, None);
    }

    #[test]
    fn test_unstable_title_edit_needs_review() {
        let remote = toc(&[("1", "A2"), ("2", "B"), ("3", "C")]);

        let outcome = merge_toc(&remote, &abc(), IdStability::Unstable);
        assert!(!outcome.has_changed);
        assert_eq!(
            outcome.review_reason,
            Some(ReviewReason::ChapterTitleChanged)
        );
        assert_eq!(
            outcome.review_reason.unwrap().to_string(),
            "chapter title changed"
        );
    }

    #[test]
    fn test_stable_addition_changes_without_review() {
        let remote = toc(&[("1", "A"), ("2", "B"), ("3", "C"), ("4", "D")]);

        let outcome = merge_toc(&remote, &abc(), IdStability::Stable);
        assert!(outcome.has_changed);
        assert_eq!(outcome.review_reason, None);
    }

    #[test]
    fn test_stable_deletion_needs_review() {
        let remote = toc(&[("1", "A"), ("3", "C"), ("4", "D")]);

        let outcome = merge_toc(&remote, &abc(), IdStability::Stable);
        assert!(outcome.has_changed);
        assert_eq!(outcome.review_reason, Some(ReviewReason::ChaptersDeleted));
    }

    #[test]
    fn test_unstable_growth_changes_without_review() {
        let remote = toc(&[("1", "X"), ("2", "Y"), ("3", "Z"), ("4", "W")]);

        let outcome = merge_toc(&remote, &abc(), IdStability::Unstable);
        assert!(outcome.has_changed);
        assert_eq!(outcome.review_reason, None);
    }

    #[test]
    fn test_unstable_shrink_always_needs_review() {
        // Same titles on shared ids, one chapter gone.
        let remote = toc(&[("1", "A"), ("2", "B")]);

        let outcome = merge_toc(&remote, &abc(), IdStability::Unstable);
        assert!(outcome.has_changed);
        assert_eq!(
            outcome.review_reason,
            Some(ReviewReason::UnknownChaptersDeleted)
        );
    }

    #[test]
    fn test_unstable_reassigned_ids_with_same_count_are_unchanged() {
        let remote = toc(&[("7", "A"), ("8", "B"), ("9", "C")]);

        let outcome = merge_toc(&remote, &abc(), IdStability::Unstable);
        assert!(!outcome.has_changed);
        assert_eq!(outcome.review_reason, None);
    }

    #[test]
    fn test_empty_remote_against_populated_local() {
        let stable = merge_toc(&[], &abc(), IdStability::Stable);
        assert!(stable.has_changed);
        assert_eq!(stable.review_reason, Some(ReviewReason::ChaptersDeleted));
        assert!(stable.toc.is_empty());

        let unstable = merge_toc(&[], &abc(), IdStability::Unstable);
        assert!(unstable.has_changed);
        assert_eq!(
            unstable.review_reason,
            Some(ReviewReason::UnknownChaptersDeleted)
        );
    }

    #[test]
    fn test_headings_do_not_count_as_chapters() {
        let mut remote = abc();
        remote.push(TocItem::heading("あとがき"));

        for stability in [IdStability::Stable, IdStability::Unstable] {
            let outcome = merge_toc(&remote, &abc(), stability);
            assert!(!outcome.has_changed);
            assert_eq!(outcome.review_reason, None);
        }
    }
}
