//! Audit records: TOC merge reviews and human text patches.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::field::Field;
use crate::key::NovelKey;
use crate::novel::TocItem;

/// Snapshot of a merge that was flagged for moderator review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocMergeHistoryEntry {
    pub id: Uuid,
    pub novel: NovelKey,
    pub created_at: DateTime<Utc>,
    pub toc_old: Vec<TocItem>,
    pub toc_new: Vec<TocItem>,
    pub reason: String,
}

/// A human correction to translated text. Absent fields are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NovelPatch {
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub title_zh: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub introduction_zh: Field<String>,
    /// Keyed by the original-language TOC title.
    #[serde(serialize_with = "serialize_set_titles")]
    pub toc: BTreeMap<String, Field<String>>,
}

fn serialize_set_titles<S: Serializer>(
    toc: &BTreeMap<String, Field<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(toc.iter().filter(|(_, title)| !title.is_unset()))
}

impl NovelPatch {
    pub fn is_empty(&self) -> bool {
        self.title_zh.is_unset()
            && self.introduction_zh.is_unset()
            && self.toc.values().all(Field::is_unset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChange {
    pub before: Option<String>,
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocTextChange {
    pub title_jp: String,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// One applied patch, recorded with the text it replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchEntry {
    pub id: Uuid,
    pub novel: NovelKey,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_zh: Option<TextChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduction_zh: Option<TextChange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub toc: Vec<TocTextChange>,
}

impl PatchEntry {
    pub fn is_empty(&self) -> bool {
        self.title_zh.is_none() && self.introduction_zh.is_none() && self.toc.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_survives_a_json_round_trip() {
        let json = r#"{"title_zh":null,"toc":{"序章":"序幕","終章":null}}"#;
        let patch: NovelPatch = serde_json::from_str(json).unwrap();
        assert_eq!(patch.title_zh, Field::Null);
        assert_eq!(patch.introduction_zh, Field::Unset);

        let written = serde_json::to_string(&patch).unwrap();
        assert!(!written.contains("introduction_zh"));
        let reread: NovelPatch = serde_json::from_str(&written).unwrap();
        assert_eq!(reread, patch);
    }

    #[test]
    fn test_unset_toc_titles_are_not_written() {
        let patch = NovelPatch {
            toc: BTreeMap::from([
                ("序章".to_string(), Field::Unset),
                ("一話".to_string(), Field::Value("第一话".to_string())),
            ]),
            ..Default::default()
        };

        let written = serde_json::to_value(&patch).unwrap();
        assert_eq!(written, serde_json::json!({"toc": {"一話": "第一话"}}));
    }
}
