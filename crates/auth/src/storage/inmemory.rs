//! In-memory account and session index storage for tests and single-process use.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use oidcache_core::auth::Account;
use oidcache_core::storage::{
    RepositoryError, Result, SessionBinding, SessionIndexRepository, UserRepository,
};

/// In-memory store for accounts and session bindings.
///
/// Accounts are keyed by email, so a second account with the same email is
/// rejected the same way a unique index would. Bindings keep insertion order.
/// Data is not persisted and is lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    bindings: Arc<RwLock<Vec<SessionBinding>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records which user and subject a session key belongs to.
    pub async fn bind_session(&self, binding: &SessionBinding) -> Result<()> {
        self.bindings.write().await.push(binding.clone());
        Ok(())
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    async fn sids_where<F>(&self, predicate: F) -> Vec<String>
    where
        F: Fn(&SessionBinding) -> bool,
    {
        self.bindings
            .read()
            .await
            .iter()
            .filter(|b| predicate(b))
            .map(|b| b.sid.clone())
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(email).cloned())
    }

    async fn create_user(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.email) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Account",
                id: account.email.clone(),
            });
        }
        accounts.insert(account.email.clone(), account.clone());
        Ok(())
    }
}

#[async_trait]
impl SessionIndexRepository for InMemoryStore {
    async fn sids_by_uid(&self, uid: &str) -> Result<Vec<String>> {
        Ok(self.sids_where(|b| b.uid == uid).await)
    }

    async fn sids_by_sub(&self, sub: &str) -> Result<Vec<String>> {
        Ok(self.sids_where(|b| b.sub == sub).await)
    }
}
