use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use marquee_core::IdentityError;
use marquee_core::IdentityService;
use marquee_core::session::{LoginRequest, RegisterRequest};
use marquee_model::RemoteUser;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Account {
    id: u64,
    name: Option<String>,
    password: String,
}

/// In-memory identity service with the same failure codes as the real one.
#[derive(Debug, Clone, Default)]
pub struct StubIdentityService {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl StubIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

fn rejected(code: &str) -> IdentityError {
    IdentityError::Rejected { code: code.into() }
}

#[async_trait]
impl IdentityService for StubIdentityService {
    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<Option<RemoteUser>, IdentityError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&request.email)
            .ok_or_else(|| rejected("ACCOUNT_NOT_FOUND"))?;
        let password = request
            .password
            .as_deref()
            .ok_or_else(|| rejected("PASSWORD_REQUIRED"))?;
        if password != account.password {
            return Err(rejected("INVALID_CREDENTIALS"));
        }
        Ok(Some(RemoteUser {
            id: Some(account.id.to_string()),
            email: request.email.clone(),
            name: account.name.clone(),
        }))
    }

    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<(), IdentityError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&request.email) {
            return Err(rejected("ACCOUNT_EXISTS"));
        }
        let id = accounts.len() as u64 + 1;
        accounts.insert(
            request.email.clone(),
            Account {
                id,
                name: request.name.clone(),
                password: request.password.clone(),
            },
        );
        Ok(())
    }
}
