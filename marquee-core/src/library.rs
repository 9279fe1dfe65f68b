//! Per-user favorites, downloads and watch history
//!
//! Each collection is a JSON array under a namespace key. Favorites and
//! downloads hold at most one entry per [`MovieKey`]; history keeps every
//! viewing, newest first.
//!
//! Mutations work on the raw array: elements this crate cannot type (older
//! shapes, fields set to `null`, stray values) are written back as found.

use std::{fmt, sync::Arc};

use marquee_model::{
    FavoriteEntry, LibraryEntry, MovieKey, UserId, now_millis,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::keys::{self, namespace};
use crate::kv::{KeyValueStore, json};

/// Key of a favorites element: a bare id or the `id` of an object.
fn favorite_key(item: &Value) -> Option<MovieKey> {
    match item {
        Value::Object(fields) => fields.get("id").and_then(MovieKey::from_json),
        other => MovieKey::from_json(other),
    }
}

/// Key of a downloads element. Only objects carry one.
fn download_key(item: &Value) -> Option<MovieKey> {
    item.get("id").and_then(MovieKey::from_json)
}

#[derive(Clone)]
pub struct LibraryStore {
    kv: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for LibraryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryStore").finish_non_exhaustive()
    }
}

impl LibraryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    // ---- favorites ----

    pub async fn get_favorites(&self, user: &UserId) -> Vec<FavoriteEntry> {
        let key = namespace(keys::FAVORITES, user);
        json::read_items(self.kv.as_ref(), &key).await
    }

    pub async fn is_favorite(&self, user: &UserId, movie: &MovieKey) -> bool {
        self.get_favorites(user)
            .await
            .iter()
            .any(|entry| entry.key() == *movie)
    }

    /// Append `movie` unless an entry with the same id is already present.
    /// Ids compare through their string form, so a legacy bare `42` blocks
    /// a new `"42"`. Returns the list as stored, or `None` if it could not
    /// be read or persisted.
    pub async fn add_favorite(
        &self,
        user: &UserId,
        movie: LibraryEntry,
    ) -> Option<Vec<FavoriteEntry>> {
        let key = namespace(keys::FAVORITES, user);
        let result = self.try_add_favorite(&key, movie).await;
        json::logged("add_favorite", &key, result)
    }

    async fn try_add_favorite(
        &self,
        key: &str,
        movie: LibraryEntry,
    ) -> Result<Vec<FavoriteEntry>> {
        let mut list = json::load_array(self.kv.as_ref(), key).await?;
        if list.iter().filter_map(favorite_key).any(|k| k == movie.id) {
            debug!(key, movie = %movie.id, "favorite already present");
            return Ok(json::typed(&list));
        }
        list.push(serde_json::to_value(&movie)?);
        json::save(self.kv.as_ref(), key, &list).await?;
        Ok(json::typed(&list))
    }

    pub async fn remove_favorite(
        &self,
        user: &UserId,
        movie: &MovieKey,
    ) -> Option<Vec<FavoriteEntry>> {
        let key = namespace(keys::FAVORITES, user);
        let result: Result<Vec<FavoriteEntry>> = async {
            let mut list = json::load_array(self.kv.as_ref(), &key).await?;
            list.retain(|item| favorite_key(item).is_none_or(|k| k != *movie));
            json::save(self.kv.as_ref(), &key, &list).await?;
            Ok(json::typed(&list))
        }
        .await;
        json::logged("remove_favorite", &key, result)
    }

    pub async fn clear_favorites(&self, user: &UserId) {
        self.clear(keys::FAVORITES, user).await;
    }

    // ---- downloads ----

    pub async fn get_downloads(&self, user: &UserId) -> Vec<LibraryEntry> {
        let key = namespace(keys::DOWNLOADS, user);
        json::read_items(self.kv.as_ref(), &key).await
    }

    /// Append `movie` stamped with the current time unless an entry with an
    /// identical id is already downloaded.
    pub async fn add_download(
        &self,
        user: &UserId,
        mut movie: LibraryEntry,
    ) -> Option<Vec<LibraryEntry>> {
        let key = namespace(keys::DOWNLOADS, user);
        let result: Result<Vec<LibraryEntry>> = async {
            let mut list = json::load_array(self.kv.as_ref(), &key).await?;
            let present = list
                .iter()
                .filter_map(download_key)
                .any(|k| k.is_identical(&movie.id));
            if present {
                return Ok(json::typed(&list));
            }
            movie.downloaded_at = Some(now_millis());
            list.push(serde_json::to_value(&movie)?);
            json::save(self.kv.as_ref(), &key, &list).await?;
            Ok(json::typed(&list))
        }
        .await;
        json::logged("add_download", &key, result)
    }

    /// Drop downloads whose `id` is identical to `movie`; no string
    /// coercion, so `"42"` leaves a numeric `42` in place.
    pub async fn remove_download(
        &self,
        user: &UserId,
        movie: &MovieKey,
    ) -> Option<Vec<LibraryEntry>> {
        let key = namespace(keys::DOWNLOADS, user);
        let result: Result<Vec<LibraryEntry>> = async {
            let mut list = json::load_array(self.kv.as_ref(), &key).await?;
            list.retain(|item| {
                download_key(item).is_none_or(|k| !k.is_identical(movie))
            });
            json::save(self.kv.as_ref(), &key, &list).await?;
            Ok(json::typed(&list))
        }
        .await;
        json::logged("remove_download", &key, result)
    }

    pub async fn clear_downloads(&self, user: &UserId) {
        self.clear(keys::DOWNLOADS, user).await;
    }

    // ---- history ----

    pub async fn get_history(&self, user: &UserId) -> Vec<LibraryEntry> {
        let key = namespace(keys::HISTORY, user);
        json::read_items(self.kv.as_ref(), &key).await
    }

    /// Record a viewing. Repeat viewings are kept as separate entries.
    pub async fn add_history(
        &self,
        user: &UserId,
        mut entry: LibraryEntry,
    ) -> Option<Vec<LibraryEntry>> {
        let key = namespace(keys::HISTORY, user);
        let result: Result<Vec<LibraryEntry>> = async {
            let mut list = json::load_array(self.kv.as_ref(), &key).await?;
            entry.watched_at = Some(now_millis());
            list.insert(0, serde_json::to_value(&entry)?);
            json::save(self.kv.as_ref(), &key, &list).await?;
            Ok(json::typed(&list))
        }
        .await;
        json::logged("add_history", &key, result)
    }

    pub async fn clear_history(&self, user: &UserId) {
        self.clear(keys::HISTORY, user).await;
    }

    async fn clear(&self, base: &str, user: &UserId) {
        let key = namespace(base, user);
        if let Err(err) = self.kv.remove(&key).await {
            warn!(key = %key, error = %err, "failed to clear collection");
        }
    }
}
