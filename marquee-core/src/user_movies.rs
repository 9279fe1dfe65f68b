//! Fan-submitted movies
//!
//! Every upload is written twice: to the owner's list under
//! `userMovies:<user>` and to the shared feed under `userMovies:all`. The
//! shared feed is newest first and cut to [`StoreLimits::global_feed_limit`]
//! on every write, so the oldest uploads fall off the end.

use std::{fmt, sync::Arc};

use marquee_model::{NewUserMovie, UserId, UserMovie, now_millis};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::ids;
use crate::keys::{self, namespace};
use crate::kv::{KeyValueStore, json};
use crate::limits::StoreLimits;

#[derive(Clone)]
pub struct UserMovieStore {
    kv: Arc<dyn KeyValueStore>,
    limits: StoreLimits,
}

impl fmt::Debug for UserMovieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserMovieStore")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl UserMovieStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, limits: StoreLimits) -> Self {
        Self { kv, limits }
    }

    pub async fn list_user_movies(&self, user: &UserId) -> Vec<UserMovie> {
        let key = namespace(keys::USER_MOVIES, user);
        json::read_or_default(self.kv.as_ref(), &key).await
    }

    pub async fn list_all_user_movies(&self) -> Vec<UserMovie> {
        json::read_or_default(self.kv.as_ref(), keys::GLOBAL_USER_MOVIES).await
    }

    /// Create an upload owned by `user`.
    ///
    /// Returns `None` when the owner's list could not be written; in that
    /// case the shared feed is left untouched. A failed shared-feed write
    /// after a successful owner write is logged and the record is still
    /// returned.
    pub async fn add_user_movie(
        &self,
        user: &UserId,
        input: NewUserMovie,
    ) -> Option<UserMovie> {
        let key = namespace(keys::USER_MOVIES, user);
        let result = self.try_add(&key, user, input).await;
        json::logged("add_user_movie", &key, result)
    }

    async fn try_add(
        &self,
        key: &str,
        user: &UserId,
        input: NewUserMovie,
    ) -> Result<UserMovie> {
        let kv = self.kv.as_ref();
        let mine: Vec<UserMovie> = json::load_or_default(kv, key).await?;
        let global: Vec<UserMovie> =
            json::load_or_default(kv, keys::GLOBAL_USER_MOVIES).await?;

        let created_at = now_millis();
        let mut id = ids::timestamped(created_at);
        while global.iter().chain(mine.iter()).any(|m| m.id == id) {
            id = ids::timestamped(created_at);
        }
        let movie = input.into_user_movie(id, user.to_string(), created_at);

        let mut mine = mine;
        mine.insert(0, movie.clone());
        json::save(kv, key, &mine).await?;

        if let Err(err) = self.publish(global, &movie).await {
            warn!(
                id = %movie.id,
                error = %err,
                "upload saved but not published to shared feed"
            );
        }
        info!(id = %movie.id, owner = %user, "user movie added");
        Ok(movie)
    }

    async fn publish(
        &self,
        global: Vec<UserMovie>,
        movie: &UserMovie,
    ) -> Result<()> {
        let mut next = Vec::with_capacity(global.len() + 1);
        next.push(movie.clone());
        next.extend(global.into_iter().filter(|m| m.id != movie.id));
        self.write_global(next).await
    }

    async fn write_global(&self, mut feed: Vec<UserMovie>) -> Result<()> {
        feed.truncate(self.limits.global_feed_limit);
        json::save(self.kv.as_ref(), keys::GLOBAL_USER_MOVIES, &feed).await
    }

    /// Delete upload `id` from the owner's list and from the shared feed.
    ///
    /// The two removals are independent: a missing entry or failed write on
    /// one side does not stop the other. Returns the owner's remaining list,
    /// or `None` when that side failed.
    pub async fn remove_user_movie(
        &self,
        user: &UserId,
        id: &str,
    ) -> Option<Vec<UserMovie>> {
        let key = namespace(keys::USER_MOVIES, user);
        let kv = self.kv.as_ref();

        let own: Result<Vec<UserMovie>> = async {
            let mut mine: Vec<UserMovie> =
                json::load_or_default(kv, &key).await?;
            mine.retain(|m| m.id != id);
            json::save(kv, &key, &mine).await?;
            Ok(mine)
        }
        .await;

        let shared: Result<()> = async {
            let mut global: Vec<UserMovie> =
                json::load_or_default(kv, keys::GLOBAL_USER_MOVIES).await?;
            global.retain(|m| m.id != id);
            self.write_global(global).await
        }
        .await;
        json::logged("remove_user_movie", keys::GLOBAL_USER_MOVIES, shared);

        json::logged("remove_user_movie", &key, own)
    }

    /// Drop the owner's list. Their uploads stay in the shared feed until
    /// they age out.
    pub async fn clear_user_movies(&self, user: &UserId) {
        let key = namespace(keys::USER_MOVIES, user);
        if let Err(err) = self.kv.remove(&key).await {
            warn!(key = %key, error = %err, "failed to clear user movies");
        }
    }

    /// Case-insensitive substring search over the shared feed. A blank term
    /// returns the whole feed.
    pub async fn search_user_movies(&self, term: &str) -> Vec<UserMovie> {
        let feed = self.list_all_user_movies().await;
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return feed;
        }
        let hits: Vec<UserMovie> = feed
            .into_iter()
            .filter(|movie| movie.haystack().contains(&needle))
            .collect();
        debug!(term = %needle, hits = hits.len(), "searched user movies");
        hits
    }
}
