//! View counting with a per-viewer cooldown.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use novella_storage::NovelUpdate;
use novella_types::NovelKey;
use tracing::debug;

use crate::error::Result;
use crate::library::Library;

const DEFAULT_PRUNE_THRESHOLD: usize = 4096;

/// Admits at most one view per (viewer, novel) within the cooldown window.
///
/// Expired hits are dropped whenever the number of tracked pairs reaches
/// the prune threshold.
#[derive(Debug)]
pub struct ViewLimiter {
    cooldown: Duration,
    prune_threshold: usize,
    last_hits: DashMap<String, Instant>,
}

impl ViewLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
            last_hits: DashMap::new(),
        }
    }

    pub fn with_prune_threshold(mut self, threshold: usize) -> Self {
        self.prune_threshold = threshold.max(1);
        self
    }

    /// Record a hit, returning `false` if the viewer is still cooling down.
    pub fn try_acquire(&self, viewer: &str, novel: &NovelKey) -> bool {
        // No entry guard may be alive while retaining.
        if self.last_hits.len() >= self.prune_threshold {
            self.prune();
        }

        let now = Instant::now();
        match self.last_hits.entry(format!("{}:{}", viewer, novel)) {
            Entry::Occupied(mut entry) => {
                if now.duration_since(*entry.get()) < self.cooldown {
                    false
                } else {
                    entry.insert(now);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    /// Forget hits whose cooldown has elapsed.
    pub fn prune(&self) {
        let cooldown = self.cooldown;
        self.last_hits.retain(|_, hit| hit.elapsed() < cooldown);
    }

    pub fn tracked(&self) -> usize {
        self.last_hits.len()
    }
}

impl Library {
    /// Count a view of the novel by `viewer` (a user id or client address).
    ///
    /// # Returns
    /// `true` if the view was counted, `false` if it was rate limited
    pub async fn increase_visited(&self, viewer: &str, key: &NovelKey) -> Result<bool> {
        if !self.views.try_acquire(viewer, key) {
            debug!("View of {} by {} rate limited", key, viewer);
            return Ok(false);
        }

        let novel = self
            .storage
            .update_novel(
                key,
                NovelUpdate {
                    visited_delta: 1,
                    ..Default::default()
                },
            )
            .await?;
        self.reindex(&novel).await;

        Ok(true)
    }
}
