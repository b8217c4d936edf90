//! Favorites collaborator.
//!
//! Each favorite record carries a copy of the novel's `update_at` so that
//! "recently updated favorites" can be listed without a join.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use novella_types::NovelKey;
use tokio::sync::RwLock;

use crate::error::CollaboratorError;

#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Copy a novel's new `update_at` onto every favorite pointing at it.
    ///
    /// # Returns
    /// The number of favorite records touched
    async fn propagate_update_at(
        &self,
        novel: &NovelKey,
        update_at: DateTime<Utc>,
    ) -> Result<u64, CollaboratorError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRecord {
    pub user_id: String,
    pub novel: NovelKey,
    pub update_at: DateTime<Utc>,
}

/// Process-local favorites.
#[derive(Debug, Default)]
pub struct MemoryFavorites {
    records: RwLock<Vec<FavoriteRecord>>,
}

impl MemoryFavorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, user_id: &str, novel: &NovelKey, update_at: DateTime<Utc>) {
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| r.user_id == user_id && r.novel == *novel)
        {
            return;
        }
        records.push(FavoriteRecord {
            user_id: user_id.to_string(),
            novel: novel.clone(),
            update_at,
        });
    }

    /// A user's favorites, most recently updated first.
    pub async fn list(&self, user_id: &str) -> Vec<FavoriteRecord> {
        let records = self.records.read().await;
        let mut favorites: Vec<FavoriteRecord> = records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        favorites.sort_by(|a, b| b.update_at.cmp(&a.update_at));
        favorites
    }
}

#[async_trait]
impl FavoritesStore for MemoryFavorites {
    async fn propagate_update_at(
        &self,
        novel: &NovelKey,
        update_at: DateTime<Utc>,
    ) -> Result<u64, CollaboratorError> {
        let mut records = self.records.write().await;
        let mut touched = 0;
        for record in records.iter_mut().filter(|r| r.novel == *novel) {
            record.update_at = update_at;
            touched += 1;
        }
        Ok(touched)
    }
}
