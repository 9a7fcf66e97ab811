use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Generic key/value cache a session store writes into.
///
/// Implementations decide eviction and any default expiry. A `None` TTL on
/// `set` means "use whatever the backend does by default".
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
