//! Sign-in flows driving per-user namespaces.

use std::sync::Arc;

use anyhow::{Context, Result};
use marquee_core::{
    AuthError, DiskStore, KeyValueStore, MemoryStore, StoreLimits, Stores,
};
use marquee_model::{LibraryEntry, NewUserMovie};

#[path = "support/mod.rs"]
mod support;

use support::identity::StubIdentityService;

fn stores(kv: Arc<dyn KeyValueStore>, identity: StubIdentityService) -> Stores {
    Stores::new(kv, Arc::new(identity), StoreLimits::default())
}

#[tokio::test]
async fn signup_then_duplicate_signup() -> Result<()> {
    let identity = StubIdentityService::new();
    let app = stores(Arc::new(MemoryStore::new()), identity.clone());

    let user = app
        .session
        .signup(" Dorji ", "Dorji@Example.com", "pw")
        .await?;
    assert_eq!(user.email, "dorji@example.com");
    assert_eq!(user.name.as_deref(), Some("Dorji"));
    assert!(app.session.is_logged_in().await);

    let err = app
        .session
        .signup("Dorji", "dorji@example.com", "pw")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountExists));
    assert_eq!(identity.account_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn login_failures_keep_session_empty() -> Result<()> {
    let identity = StubIdentityService::new();
    let app = stores(Arc::new(MemoryStore::new()), identity);

    let err = app
        .session
        .login("nobody@example.com", Some("pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountNotFound));

    app.session.signup("", "a@example.com", "right").await?;
    app.session.logout().await?;

    let err = app
        .session
        .login("a@example.com", Some("wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    let err = app.session.login("a@example.com", None).await.unwrap_err();
    assert!(matches!(err, AuthError::PasswordRequired));
    assert!(!app.session.is_logged_in().await);
    Ok(())
}

#[tokio::test]
async fn switching_accounts_switches_namespaces() -> Result<()> {
    let app = stores(Arc::new(MemoryStore::new()), StubIdentityService::new());

    let first = app.session.login_offline("first@example.com").await?;
    app.library
        .add_favorite(&first.user_id(), LibraryEntry::new(1u64, "Mine"))
        .await
        .context("favorite")?;
    app.user_movies
        .add_user_movie(&first.user_id(), NewUserMovie::new("Shared", ""))
        .await
        .context("upload")?;

    app.session.logout().await?;
    let second = app.session.login_offline("second@example.com").await?;
    let current = app.session.current_user_id().await.context("signed in")?;
    assert_eq!(current, second.user_id());

    assert!(app.library.get_favorites(&current).await.is_empty());
    assert!(app.user_movies.list_user_movies(&current).await.is_empty());
    assert_eq!(app.user_movies.list_all_user_movies().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn disk_backend_keeps_state_across_instances() -> Result<()> {
    let dir = tempfile::tempdir()?;
    {
        let kv = Arc::new(DiskStore::new(dir.path()));
        let app = stores(kv, StubIdentityService::new());
        let user = app.session.login_offline("disk@example.com").await?;
        app.library
            .add_history(&user.user_id(), LibraryEntry::new(5u64, "Watched"))
            .await
            .context("history")?;
        app.watchlist.add(5).await.context("watchlist")?;
    }

    let kv = Arc::new(DiskStore::new(dir.path()));
    let app = stores(kv, StubIdentityService::new());
    let user = app.session.get_user().await.context("user persisted")?;
    assert_eq!(app.library.get_history(&user.user_id()).await.len(), 1);
    assert!(app.watchlist.contains(5).await);

    app.session.logout().await?;
    assert!(app.session.get_user().await.is_none());
    Ok(())
}
