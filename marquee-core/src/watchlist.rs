//! Shared watchlist of catalog ids, kept under one global key.

use std::{fmt, sync::Arc};

use crate::error::Result;
use crate::keys;
use crate::kv::{KeyValueStore, json};

#[derive(Clone)]
pub struct Watchlist {
    kv: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for Watchlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watchlist").finish_non_exhaustive()
    }
}

impl Watchlist {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn load(&self) -> Vec<u64> {
        json::read_or_default(self.kv.as_ref(), keys::WATCHLIST).await
    }

    pub async fn contains(&self, id: u64) -> bool {
        self.load().await.contains(&id)
    }

    pub async fn add(&self, id: u64) -> Option<Vec<u64>> {
        let result = self
            .update(|ids| {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            })
            .await;
        json::logged("watchlist_add", keys::WATCHLIST, result)
    }

    pub async fn remove(&self, id: u64) -> Option<Vec<u64>> {
        let result =
            self.update(|ids| ids.retain(|existing| *existing != id)).await;
        json::logged("watchlist_remove", keys::WATCHLIST, result)
    }

    /// Flip membership of `id`; returns whether it is now on the list.
    pub async fn toggle(&self, id: u64) -> Option<bool> {
        let mut added = false;
        let result = self
            .update(|ids| {
                let found = ids.iter().position(|existing| *existing == id);
                if let Some(pos) = found {
                    ids.remove(pos);
                } else {
                    ids.push(id);
                    added = true;
                }
            })
            .await;
        json::logged("watchlist_toggle", keys::WATCHLIST, result).map(|_| added)
    }

    async fn update<F>(&self, apply: F) -> Result<Vec<u64>>
    where
        F: FnOnce(&mut Vec<u64>) + Send,
    {
        let mut ids: Vec<u64> =
            json::load_or_default(self.kv.as_ref(), keys::WATCHLIST).await?;
        apply(&mut ids);
        json::save(self.kv.as_ref(), keys::WATCHLIST, &ids).await?;
        Ok(ids)
    }
}
