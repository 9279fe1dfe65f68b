//! Marquee core: persistence and sync for a movie discovery client
//!
//! All state is JSON documents in a [`KeyValueStore`]. The stores here
//! never fail hard on storage problems: reads fall back to empty values and
//! mutations report `None` after logging, so a broken disk degrades to
//! missing personal data rather than an error screen. A mutation never
//! writes back a document it could not read.
//!
//! Keys per store:
//!
//! - [`LibraryStore`]: `favorites:<user>`, `downloads:<user>`,
//!   `watchHistory:<user>`
//! - [`UserMovieStore`]: `userMovies:<user>`, `userMovies:all`
//! - [`NotificationCenter`]: `notifications:list`,
//!   `notifications:seenMovieIds`
//! - [`SessionStore`]: `user`
//! - [`Watchlist`]: `BHUTAN_MOVIE_WATCHLIST`

pub mod error;
mod ids;
pub mod keys;
pub mod kv;
pub mod library;
pub mod limits;
pub mod notifications;
pub mod search;
pub mod session;
pub mod user_movies;
pub mod watchlist;

use std::sync::Arc;

pub use error::{Result as StoreResult, StoreError};
pub use kv::{DiskStore, KeyValueStore, MemoryStore};
pub use library::LibraryStore;
pub use limits::StoreLimits;
pub use notifications::{NotificationCenter, dedupe_candidates};
pub use search::SearchRow;
pub use session::{
    AuthError, AuthResult, HttpIdentityService, IdentityError,
    IdentityService, SessionStore,
};
pub use user_movies::UserMovieStore;
pub use watchlist::Watchlist;

/// Every store wired to one backend.
#[derive(Debug, Clone)]
pub struct Stores {
    pub library: LibraryStore,
    pub user_movies: UserMovieStore,
    pub notifications: NotificationCenter,
    pub session: SessionStore,
    pub watchlist: Watchlist,
}

impl Stores {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        identity: Arc<dyn IdentityService>,
        limits: StoreLimits,
    ) -> Self {
        Self {
            library: LibraryStore::new(kv.clone()),
            user_movies: UserMovieStore::new(kv.clone(), limits),
            notifications: NotificationCenter::new(kv.clone(), limits),
            session: SessionStore::new(kv.clone(), identity),
            watchlist: Watchlist::new(kv),
        }
    }
}
