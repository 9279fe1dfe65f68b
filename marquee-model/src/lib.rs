//! Core data model definitions shared across Marquee crates.
#![allow(missing_docs)]

pub mod catalog;
pub mod identity;
pub mod ids;
pub mod library;
pub mod notification;
pub mod user_movie;

// Intentionally curated re-exports for downstream consumers.
pub use catalog::{CandidateMovie, CatalogMovie};
pub use identity::{Identity, RemoteUser, normalize_email};
pub use ids::{MovieKey, UserId};
pub use library::{FavoriteEntry, LibraryEntry};
pub use notification::AppNotification;
pub use user_movie::{NewUserMovie, UserMovie};

/// Current wall-clock time as Unix milliseconds, the timestamp unit used by
/// every persisted record.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
