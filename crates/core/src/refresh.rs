//! Deciding when stored metadata is trusted and when it is re-fetched.

use std::time::Duration;

use chrono::{DateTime, Utc};
use novella_storage::NovelUpdate;
use novella_types::{Novel, NovelKey, RemoteMetadata, TocMergeHistoryEntry};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::library::Library;
use crate::merge::{IdStability, merge_toc};

/// Whether metadata synced at `sync_at` is still fresh at `now`.
pub fn within_expiry(sync_at: DateTime<Utc>, now: DateTime<Utc>, expiry: Duration) -> bool {
    match chrono::Duration::from_std(expiry) {
        Ok(expiry) => now - sync_at <= expiry,
        // Longer than chrono can represent: never expires
        Err(_) => true,
    }
}

impl Library {
    /// Get a novel, re-fetching it from its provider when the stored copy is
    /// older than `expiry`.
    ///
    /// Stored novels are served as-is when paused, when their provider is
    /// exempt from refresh or unregistered, and when the provider cannot be
    /// reached. Only a novel that was never stored surfaces fetch failures.
    pub async fn get_or_refresh(&self, key: &NovelKey, expiry: Duration) -> Result<Novel> {
        let stored = self.storage.get_novel(key).await?;

        let Some(provider) = self.providers.get(&key.provider_id) else {
            return match stored {
                Some(novel) => {
                    warn!("No adapter for {}, serving stored copy", key.provider_id);
                    Ok(novel)
                }
                None => Err(Error::not_found("Provider", &key.provider_id)),
            };
        };

        let Some(stored) = stored else {
            return self.create_from_remote(key).await;
        };

        let capabilities = provider.capabilities();
        if stored.pause_update || capabilities.refresh_exempt {
            debug!("Updates disabled for {}, serving stored copy", key);
            return Ok(stored);
        }

        let now = Utc::now();
        if within_expiry(stored.sync_at, now, expiry) {
            debug!("Metadata of {} is fresh, serving stored copy", key);
            return Ok(stored);
        }

        let remote = match self
            .call_provider(provider.get_metadata(&key.novel_id))
            .await
        {
            Ok(remote) => remote,
            Err(e) => {
                warn!("Failed to refresh {}, serving stale copy: {}", key, e);
                return Ok(stored);
            }
        };

        self.apply_remote(stored, remote, capabilities.id_stability, now)
            .await
    }

    /// Stop or resume refreshing a stored novel.
    pub async fn set_pause_update(&self, key: &NovelKey, pause: bool) -> Result<Novel> {
        let novel = self
            .storage
            .update_novel(
                key,
                NovelUpdate {
                    pause_update: Some(pause),
                    ..Default::default()
                },
            )
            .await?;
        info!("Updates of {} {}", key, if pause { "paused" } else { "resumed" });
        Ok(novel)
    }

    async fn create_from_remote(&self, key: &NovelKey) -> Result<Novel> {
        let provider = self.provider(&key.provider_id)?;
        let remote = self
            .call_provider(provider.get_metadata(&key.novel_id))
            .await
            .map_err(|source| Error::UpstreamFetch {
                key: key.to_string(),
                source,
            })?;

        let novel = Novel::from_remote(key, remote, Uuid::new_v4().to_string(), Utc::now());

        match self.storage.insert_novel(&novel).await {
            Ok(()) => {
                info!("Added novel {} ({})", key, novel.title_jp);
                self.reindex(&novel).await;
                Ok(novel)
            }
            Err(e) if e.is_already_exists() => {
                // Another request stored it first; theirs is as good as ours
                debug!("Novel {} was inserted concurrently", key);
                self.get_novel(key).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Merge fresh remote metadata into the stored novel and persist it.
    async fn apply_remote(
        &self,
        stored: Novel,
        remote: RemoteMetadata,
        stability: IdStability,
        now: DateTime<Utc>,
    ) -> Result<Novel> {
        let key = stored.key();
        let outcome = merge_toc(&remote.toc, &stored.toc, stability);

        // The audit record goes first so a crash before the metadata commit
        // cannot lose it. A retry may write it twice.
        if let Some(reason) = outcome.review_reason {
            let entry = TocMergeHistoryEntry {
                id: Uuid::new_v4(),
                novel: key.clone(),
                created_at: now,
                toc_old: stored.toc,
                toc_new: outcome.toc.clone(),
                reason: reason.to_string(),
            };
            self.storage.append_merge_history(&entry).await?;
            info!("TOC merge of {} flagged for review: {}", key, reason);
        }

        let mut update = NovelUpdate {
            title_jp: Some(remote.title),
            novel_type: Some(remote.novel_type),
            attentions: Some(remote.attentions),
            keywords: Some(remote.keywords),
            points: remote.points.into(),
            total_characters: remote.total_characters.into(),
            introduction_jp: Some(remote.introduction),
            toc: Some(outcome.toc),
            sync_at: Some(now),
            ..Default::default()
        };
        if outcome.has_changed {
            update.change_at = Some(now);
            update.update_at = Some(now);
        }

        let novel = self.storage.update_novel(&key, update).await?;
        debug!(
            "Refreshed {} (changed: {}, chapters: {})",
            key,
            outcome.has_changed,
            novel.toc_chapter_count()
        );

        self.reindex(&novel).await;

        if outcome.has_changed {
            match self
                .favorites
                .propagate_update_at(&key, novel.update_at)
                .await
            {
                Ok(touched) => debug!("Propagated update of {} to {} favorites", key, touched),
                Err(e) => warn!("Failed to propagate update of {} to favorites: {}", key, e),
            }
        }

        Ok(novel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_expiry() {
        let now = Utc::now();
        let hour = Duration::from_secs(3600);

        assert!(within_expiry(now - chrono::Duration::minutes(59), now, hour));
        assert!(within_expiry(now - chrono::Duration::hours(1), now, hour));
        assert!(!within_expiry(now - chrono::Duration::minutes(61), now, hour));
        assert!(within_expiry(now - chrono::Duration::days(3650), now, Duration::MAX));
    }
}
