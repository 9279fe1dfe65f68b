//! Storage key layout
//!
//! Per-user collections live under `"{base}:{user}"` where `user` is the
//! normalized account email. Shared data uses fixed keys with no suffix.

use marquee_model::UserId;

pub const USER: &str = "user";
pub const FAVORITES: &str = "favorites";
pub const DOWNLOADS: &str = "downloads";
pub const HISTORY: &str = "watchHistory";
pub const USER_MOVIES: &str = "userMovies";
pub const GLOBAL_USER_MOVIES: &str = "userMovies:all";
pub const NOTIFICATIONS: &str = "notifications:list";
pub const NOTIFIED_IDS: &str = "notifications:seenMovieIds";
pub const WATCHLIST: &str = "BHUTAN_MOVIE_WATCHLIST";

/// Compose the per-user key for `base`.
pub fn namespace(base: &str, user: &UserId) -> String {
    format!("{base}:{user}")
}
