//! Key-value persistence port and its adapters
//!
//! Every collection in this crate is a JSON document stored under one string
//! key. Stores follow a read-modify-write cycle against this port: load the
//! whole document, change it in memory, write the whole document back.
//!
//! There is no cross-key transaction and no per-key locking. Two in-flight
//! writers to the same key can race and one write is lost; the application
//! drives one screen for one user at a time, so this is accepted.

mod disk;
pub(crate) mod json;
mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;

/// Durable string-keyed storage.
///
/// Implementations may fail on any call; callers in this crate log the
/// failure and fall back to an empty value instead of propagating it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting an absent key succeeds
    async fn remove(&self, key: &str) -> Result<()>;
}
