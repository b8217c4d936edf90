//! Novel glossaries: fixed term translations engines must respect.

use chrono::Utc;
use novella_storage::NovelUpdate;
use novella_types::{Glossary, NovelKey};
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::library::Library;

fn validate(glossary: &Glossary) -> Result<()> {
    for (term, translation) in glossary {
        if term.trim().is_empty() {
            return Err(Error::Validation("glossary term is empty".to_string()));
        }
        if translation.trim().is_empty() {
            return Err(Error::Validation(format!(
                "glossary term {} has no translation",
                term
            )));
        }
    }
    Ok(())
}

impl Library {
    /// Replace a novel's glossary.
    ///
    /// A new glossary version id is issued only when the terms actually
    /// change; translations stored under the previous id become expired.
    ///
    /// # Returns
    /// The glossary version id now current
    pub async fn update_glossary(&self, key: &NovelKey, glossary: Glossary) -> Result<String> {
        validate(&glossary)?;

        let novel = self.get_novel(key).await?;
        if novel.glossary == glossary {
            return Ok(novel.glossary_id);
        }

        let glossary_id = Uuid::new_v4().to_string();
        let update = NovelUpdate {
            glossary: Some(glossary),
            glossary_id: Some(glossary_id.clone()),
            change_at: Some(Utc::now()),
            ..Default::default()
        };
        let novel = self.storage.update_novel(key, update).await?;
        self.reindex(&novel).await;

        info!(
            "Glossary of {} is now {} ({} terms)",
            key,
            glossary_id,
            novel.glossary.len()
        );
        Ok(glossary_id)
    }
}
