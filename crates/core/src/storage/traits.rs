use async_trait::async_trait;

use crate::auth::Account;

use super::Result;

/// Repository for local user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets an account by its email address.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Creates a new account.
    ///
    /// Implementations must reject a second account with the same email
    /// with `RepositoryError::AlreadyExists`.
    async fn create_user(&self, account: &Account) -> Result<()>;
}

/// Read access to the session index.
///
/// Rows are written by whoever completes the login; this side only queries.
#[async_trait]
pub trait SessionIndexRepository: Send + Sync {
    /// Gets the session keys bound to a local user id, in insertion order.
    async fn sids_by_uid(&self, uid: &str) -> Result<Vec<String>>;

    /// Gets the session keys bound to a provider subject, in insertion order.
    async fn sids_by_sub(&self, sub: &str) -> Result<Vec<String>>;
}
