use serde::{Deserialize, Serialize};

/// Size and time bounds applied by the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreLimits {
    /// Newest-first cap on the shared fan-upload feed
    pub global_feed_limit: usize,
    /// Newest-first cap on the notification feed
    pub notification_limit: usize,
    /// Releases older than this many days never produce a notification
    pub release_window_days: u32,
}

impl StoreLimits {
    pub const DEFAULT_GLOBAL_FEED_LIMIT: usize = 80;
    pub const DEFAULT_NOTIFICATION_LIMIT: usize = 40;
    pub const DEFAULT_RELEASE_WINDOW_DAYS: u32 = 14;

    pub fn release_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.release_window_days))
    }
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            global_feed_limit: Self::DEFAULT_GLOBAL_FEED_LIMIT,
            notification_limit: Self::DEFAULT_NOTIFICATION_LIMIT,
            release_window_days: Self::DEFAULT_RELEASE_WINDOW_DAYS,
        }
    }
}
