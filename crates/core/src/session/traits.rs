use async_trait::async_trait;

use super::{Result, SessionValue};

/// Storage contract an OIDC client uses for its login sessions.
///
/// `get` fails with [`super::SessionError::NotFound`] for a missing key so
/// callers can treat the backend as a plain mapping.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Stores a session under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &SessionValue) -> Result<()>;

    /// Loads the session stored under `key`.
    async fn get(&self, key: &str) -> Result<SessionValue>;

    /// Removes the session stored under `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Whether a session is stored under `key`.
    async fn contains(&self, key: &str) -> Result<bool>;

    /// Session keys bound to a local user id.
    async fn get_by_uid(&self, uid: &str) -> Result<Vec<String>>;

    /// Session keys bound to a provider subject.
    async fn get_by_sub(&self, sub: &str) -> Result<Vec<String>>;

    /// Session keys whose attribute `attr` equals `val`.
    async fn get_by_attribute(&self, attr: &str, val: &str) -> Result<Vec<String>>;
}
