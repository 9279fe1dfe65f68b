use std::{sync::Arc, time::Duration};

use anyhow::Context;
use marquee_core::{
    DiskStore, HttpIdentityService, KeyValueStore, MemoryStore, Stores,
};
use tracing::info;

use crate::models::{MarqueeConfig, StorageBackend};

/// Wire every store to the backend and identity service named in `config`.
pub fn build_stores(config: &MarqueeConfig) -> anyhow::Result<Stores> {
    let kv: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Disk => {
            Arc::new(DiskStore::new(&config.storage.data_dir))
        }
    };

    let identity = HttpIdentityService::with_timeout(
        config.identity.url()?,
        Duration::from_secs(config.identity.timeout_secs),
    )
    .context("failed to build identity client")?;

    info!(
        backend = ?config.storage.backend,
        data_dir = %config.storage.data_dir.display(),
        identity = %identity.base_url(),
        "stores ready"
    );
    Ok(Stores::new(kv, Arc::new(identity), config.limits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_model::LibraryEntry;

    #[tokio::test]
    async fn disk_config_persists_between_builds() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = MarqueeConfig::default();
        config.storage.data_dir = dir.path().to_path_buf();

        let stores = build_stores(&config).unwrap();
        let user =
            stores.session.login_offline("cli@example.com").await.unwrap();
        stores
            .library
            .add_favorite(&user.user_id(), LibraryEntry::new(3u64, "Three"))
            .await
            .unwrap();

        let reopened = build_stores(&config).unwrap();
        let user_id = reopened.session.current_user_id().await.unwrap();
        assert_eq!(reopened.library.get_favorites(&user_id).await.len(), 1);
    }
}
