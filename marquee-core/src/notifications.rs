//! New-release notification feed
//!
//! [`NotificationCenter::sync_new_movie_notifications`] turns recently
//! released catalog titles into in-app notifications. Each source movie id
//! is notified at most once: ids are remembered in
//! `notifications:seenMovieIds`, which is kept apart from the feed so
//! clearing the feed never re-notifies.

use std::{
    collections::HashSet,
    fmt,
    sync::Arc,
};

use chrono::{DateTime, NaiveDate, Utc};
use marquee_model::{AppNotification, CandidateMovie};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::ids;
use crate::keys;
use crate::kv::{KeyValueStore, json};
use crate::limits::StoreLimits;

const FALLBACK_TITLE: &str = "New movie available";

#[derive(Clone)]
pub struct NotificationCenter {
    kv: Arc<dyn KeyValueStore>,
    limits: StoreLimits,
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl NotificationCenter {
    pub fn new(kv: Arc<dyn KeyValueStore>, limits: StoreLimits) -> Self {
        Self { kv, limits }
    }

    pub async fn get_notifications(&self) -> Vec<AppNotification> {
        json::read_or_default(self.kv.as_ref(), keys::NOTIFICATIONS).await
    }

    pub async fn get_unread_count(&self) -> usize {
        self.get_notifications()
            .await
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    /// Mark every notification read and persist the feed. Returns the
    /// updated feed, or an empty one when the feed could not be loaded or
    /// saved; the stored feed is left as it was in that case.
    pub async fn mark_all_read(&self) -> Vec<AppNotification> {
        match self.try_mark_all_read().await {
            Ok(feed) => feed,
            Err(err) => {
                warn!(error = %err, "failed to mark notifications read");
                Vec::new()
            }
        }
    }

    async fn try_mark_all_read(&self) -> Result<Vec<AppNotification>> {
        let kv = self.kv.as_ref();
        let mut feed: Vec<AppNotification> =
            json::load_or_default(kv, keys::NOTIFICATIONS).await?;
        for notification in &mut feed {
            notification.read = true;
        }
        json::save(kv, keys::NOTIFICATIONS, &feed).await?;
        Ok(feed)
    }

    /// Drop the feed. Already-notified ids are kept.
    pub async fn clear_notifications(&self) {
        if let Err(err) = self.kv.remove(keys::NOTIFICATIONS).await {
            warn!(error = %err, "failed to clear notifications");
        }
    }

    pub async fn sync_new_movie_notifications(
        &self,
        candidates: &[CandidateMovie],
    ) -> usize {
        self.sync_new_movie_notifications_at(candidates, Utc::now())
            .await
    }

    /// Synthesize notifications for candidates released within the window
    /// ending at `now` that were never notified before. Returns how many were
    /// added; when that is zero nothing is written.
    pub async fn sync_new_movie_notifications_at(
        &self,
        candidates: &[CandidateMovie],
        now: DateTime<Utc>,
    ) -> usize {
        match self.try_sync(candidates, now).await {
            Ok(added) => added,
            Err(err) => {
                warn!(error = %err, "notification sync failed");
                0
            }
        }
    }

    async fn try_sync(
        &self,
        candidates: &[CandidateMovie],
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let kv = self.kv.as_ref();
        let mut seen_ids: Vec<u64> =
            json::load_or_default(kv, keys::NOTIFIED_IDS).await?;
        let mut seen: HashSet<u64> = seen_ids.iter().copied().collect();
        let cutoff = now - self.limits.release_window();

        let mut fresh = Vec::new();
        for candidate in candidates {
            let Some(id) = candidate.usable_id() else {
                continue;
            };
            if seen.contains(&id) {
                continue;
            }
            let Some(released) =
                candidate.release().and_then(parse_release_date)
            else {
                continue;
            };
            if released < cutoff {
                continue;
            }
            seen.insert(id);
            seen_ids.push(id);
            fresh.push(notification_for(candidate, id, now));
        }

        if fresh.is_empty() {
            debug!(candidates = candidates.len(), "no new releases to notify");
            return Ok(0);
        }

        let existing: Vec<AppNotification> =
            json::load_or_default(kv, keys::NOTIFICATIONS).await?;
        let added = fresh.len().min(self.limits.notification_limit);
        let mut feed = fresh;
        feed.extend(existing);
        feed.truncate(self.limits.notification_limit);

        json::save(kv, keys::NOTIFICATIONS, &feed).await?;
        json::save(kv, keys::NOTIFIED_IDS, &seen_ids).await?;
        info!(added, "synthesized release notifications");
        Ok(added)
    }
}

/// Parse `YYYY-MM-DD` (as UTC midnight) or a full RFC 3339 timestamp.
pub fn parse_release_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn notification_for(
    candidate: &CandidateMovie,
    movie_id: u64,
    now: DateTime<Utc>,
) -> AppNotification {
    let created_at = now.timestamp_millis();
    let title = candidate.display_title().unwrap_or(FALLBACK_TITLE);
    AppNotification {
        id: format!(
            "{movie_id}-{created_at}-{}",
            ids::random_suffix(ids::SUFFIX_LEN)
        ),
        movie_id: Some(movie_id),
        title: title.to_string(),
        message: format!(
            "{title} just dropped for you. Tap to start watching!"
        ),
        poster_path: candidate.artwork().map(str::to_string),
        created_at,
        read: false,
    }
}

/// Merge catalog pages into one pool, keeping the first occurrence of each
/// id. Candidates without a usable id are kept as-is.
pub fn dedupe_candidates<I>(pages: I) -> Vec<CandidateMovie>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = CandidateMovie>,
{
    let mut seen = HashSet::new();
    pages
        .into_iter()
        .flatten()
        .filter(|candidate| match candidate.usable_id() {
            Some(id) => seen.insert(id),
            None => true,
        })
        .collect()
}
