//! Port for the remote identity service

use async_trait::async_trait;
use marquee_model::RemoteUser;
use serde::Serialize;
use thiserror::Error;

/// Body of a login call. `password` is sent as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Option<String>,
}

/// Body of a registration call. `name` is sent as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: Option<String>,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The service answered with a failure code such as `ACCOUNT_EXISTS`
    #[error("identity service rejected the request: {code}")]
    Rejected { code: String },

    #[error("identity service returned status {status}")]
    Status { status: u16 },

    #[error("identity service unreachable: {0}")]
    Transport(String),

    #[error("invalid identity service response: {0}")]
    InvalidResponse(String),
}

/// Remote account authority. Credentials are only ever checked here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Returns the account record, or `None` when the service accepted the
    /// call but sent no user back
    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<Option<RemoteUser>, IdentityError>;

    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<(), IdentityError>;
}
