//! Signed-in identity
//!
//! The current identity is a single JSON record under the `user` key. It is
//! written only after the remote identity service accepts the credentials
//! and removed on logout. Every per-user store is keyed by
//! [`Identity::user_id`] of this record.

mod http;
mod identity;

pub use http::HttpIdentityService;
pub use identity::{
    IdentityError, IdentityService, LoginRequest, RegisterRequest,
};
#[cfg(test)]
pub use identity::MockIdentityService;

use std::{fmt, sync::Arc};

use marquee_model::{Identity, UserId, normalize_email};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::keys;
use crate::kv::{KeyValueStore, json};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("An account with this email already exists")]
    AccountExists,

    #[error("No account found for this email")]
    AccountNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("A password is required for this account")]
    PasswordRequired,

    #[error("Authentication failed: {0}")]
    Failed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

impl AuthError {
    pub const LOGIN_FAILED: &'static str = "LOGIN_FAILED";

    /// Map a failure code sent by the identity service.
    pub fn from_code(code: &str) -> Self {
        match code {
            "ACCOUNT_EXISTS" => Self::AccountExists,
            "ACCOUNT_NOT_FOUND" => Self::AccountNotFound,
            "INVALID_CREDENTIALS" => Self::InvalidCredentials,
            "PASSWORD_REQUIRED" => Self::PasswordRequired,
            other => Self::Failed(other.to_string()),
        }
    }

    /// Stable code for display layers.
    pub fn code(&self) -> &str {
        match self {
            Self::AccountExists => "ACCOUNT_EXISTS",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::PasswordRequired => "PASSWORD_REQUIRED",
            Self::Failed(code) => code,
            Self::Storage(_) => Self::LOGIN_FAILED,
        }
    }
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected { code } => Self::from_code(&code),
            other => {
                warn!(error = %other, "identity call failed");
                Self::Failed(Self::LOGIN_FAILED.to_string())
            }
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    identity: Arc<dyn IdentityService>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        identity: Arc<dyn IdentityService>,
    ) -> Self {
        Self { kv, identity }
    }

    /// Check credentials remotely and remember the returned account.
    pub async fn login(
        &self,
        email: &str,
        password: Option<&str>,
    ) -> AuthResult<Identity> {
        let request = LoginRequest {
            email: normalize_email(email),
            password: password.filter(|p| !p.is_empty()).map(str::to_string),
        };

        let user = self
            .identity
            .login(&request)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        let identity = Identity::from(user);
        self.store(&identity).await?;
        info!(user = %identity.user_id(), "signed in");
        Ok(identity)
    }

    /// Remember `email` as the current identity without contacting the
    /// identity service.
    pub async fn login_offline(&self, email: &str) -> AuthResult<Identity> {
        let identity = Identity::from_email(email);
        self.store(&identity).await?;
        info!(user = %identity.user_id(), "signed in offline");
        Ok(identity)
    }

    /// Register a new account, then sign in with the same credentials.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<Identity> {
        let name = name.trim();
        let request = RegisterRequest {
            email: normalize_email(email),
            name: (!name.is_empty()).then(|| name.to_string()),
            password: password.to_string(),
        };
        self.identity.register(&request).await?;
        info!(email = %request.email, "account registered");

        self.login(&request.email, Some(password)).await
    }

    pub async fn logout(&self) -> AuthResult<()> {
        self.kv.remove(keys::USER).await?;
        info!("signed out");
        Ok(())
    }

    /// The stored identity, or `None` when signed out or unreadable.
    pub async fn get_user(&self) -> Option<Identity> {
        json::read_or_default(self.kv.as_ref(), keys::USER).await
    }

    pub async fn current_user_id(&self) -> Option<UserId> {
        self.get_user().await.map(|identity| identity.user_id())
    }

    /// Whether an identity record is present. The record is not parsed.
    pub async fn is_logged_in(&self) -> bool {
        match self.kv.get(keys::USER).await {
            Ok(raw) => raw.is_some_and(|r| !r.is_empty()),
            Err(err) => {
                warn!(error = %err, "failed to check session");
                false
            }
        }
    }

    async fn store(&self, identity: &Identity) -> AuthResult<()> {
        json::save(self.kv.as_ref(), keys::USER, identity).await?;
        Ok(())
    }
}
