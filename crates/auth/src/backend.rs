//! Session backend that keeps OIDC session state in a shared cache.
//!
//! Session values live in the cache slot the provider is configured with,
//! so every server process pointed at the same cache sees the same
//! sessions. Lookups by user id or subject go through the session index,
//! which the cache cannot answer.

use std::sync::Arc;

use async_trait::async_trait;

use oidcache_core::cache::Cache;
use oidcache_core::session::{
    decode_session, encode_session, Result, SessionBackend, SessionError, SessionValue,
};
use oidcache_core::storage::SessionIndexRepository;

use crate::config::BridgeConfig;
use crate::error::AuthError;
use crate::registry::CacheRegistry;

/// Cache-backed [`SessionBackend`] for one OIDC provider.
#[derive(Clone)]
pub struct CacheSessionBackend {
    provider: String,
    cache: Arc<dyn Cache>,
    index: Arc<dyn SessionIndexRepository>,
}

impl CacheSessionBackend {
    /// Binds to the cache slot configured for provider `op_name`.
    ///
    /// # Errors
    ///
    /// - `ProviderNotConfigured` if `op_name` is unknown
    /// - `CacheNotConfigured` if its slot is missing from the registry
    pub fn new(
        op_name: &str,
        config: &BridgeConfig,
        caches: &CacheRegistry,
        index: Arc<dyn SessionIndexRepository>,
    ) -> std::result::Result<Self, AuthError> {
        let settings = config.provider(op_name)?;
        let cache = caches.get(&settings.cache_backend)?;

        tracing::debug!(provider = op_name, slot = %settings.cache_backend, "Session backend bound");

        Ok(Self::from_parts(op_name, cache, index))
    }

    /// Builds a backend around an existing cache handle.
    pub fn from_parts(
        provider: impl Into<String>,
        cache: Arc<dyn Cache>,
        index: Arc<dyn SessionIndexRepository>,
    ) -> Self {
        Self {
            provider: provider.into(),
            cache,
            index,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

impl std::fmt::Debug for CacheSessionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheSessionBackend")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionBackend for CacheSessionBackend {
    async fn set(&self, key: &str, value: &SessionValue) -> Result<()> {
        tracing::debug!(provider = %self.provider, key, "Storing session");
        let bytes = encode_session(value)?;
        self.cache.set(key, &bytes, None).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<SessionValue> {
        tracing::debug!(provider = %self.provider, key, "Loading session");
        let bytes = self
            .cache
            .get(key)
            .await?
            .ok_or_else(|| SessionError::NotFound(key.to_string()))?;
        Ok(decode_session(&bytes)?)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        tracing::debug!(provider = %self.provider, key, "Deleting session");
        self.cache.delete(key).await?;
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool> {
        tracing::debug!(provider = %self.provider, key, "Checking session");
        Ok(self.cache.get(key).await?.is_some())
    }

    async fn get_by_uid(&self, uid: &str) -> Result<Vec<String>> {
        tracing::debug!(provider = %self.provider, uid, "Looking up sessions by uid");
        Ok(self.index.sids_by_uid(uid).await?)
    }

    async fn get_by_sub(&self, sub: &str) -> Result<Vec<String>> {
        tracing::debug!(provider = %self.provider, sub, "Looking up sessions by sub");
        Ok(self.index.sids_by_sub(sub).await?)
    }

    async fn get_by_attribute(&self, attr: &str, _val: &str) -> Result<Vec<String>> {
        tracing::debug!(provider = %self.provider, attr, "Attribute lookup requested");
        Err(SessionError::NotImplemented("get_by_attribute"))
    }
}
