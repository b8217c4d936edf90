//! Fetch-through reads of chapter text.

use novella_types::{Chapter, ChapterKey};
use tracing::debug;

use crate::error::{Error, Result};
use crate::library::Library;

impl Library {
    /// Get a chapter, fetching it from the provider on first access.
    ///
    /// Two readers may fetch the same uncached chapter at once. The loser of
    /// the insert race reads back the winner's copy.
    pub async fn get_or_fetch_chapter(&self, key: &ChapterKey) -> Result<Chapter> {
        if let Some(chapter) = self.storage.get_chapter(key).await? {
            return Ok(chapter);
        }

        // Chapters are only stored under known novels
        self.get_novel(&key.novel).await?;

        let provider = self.provider(&key.novel.provider_id)?;
        let remote = self
            .call_provider(provider.get_chapter(&key.novel.novel_id, &key.chapter_id))
            .await
            .map_err(|source| Error::UpstreamFetch {
                key: key.to_string(),
                source,
            })?;

        let chapter = Chapter::new(key, remote.paragraphs);
        match self.record_fetched_chapter(&chapter).await {
            Ok(jp_count) => {
                debug!("Stored chapter {} ({} chapters stored)", key, jp_count);
                Ok(chapter)
            }
            Err(Error::Conflict(_)) => {
                debug!("Chapter {} was inserted concurrently", key);
                self.storage
                    .get_chapter(key)
                    .await?
                    .ok_or_else(|| Error::not_found("Chapter", key))
            }
            Err(e) => Err(e),
        }
    }
}
