//! Named cache slots.
//!
//! Each provider stores its sessions in the slot named by its
//! `cache_backend` setting. The registry maps those names to live cache
//! handles shared by every session backend that uses them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use oidcache_core::cache::Cache;

use crate::config::{BridgeConfig, CacheKind, CacheSettings};
use crate::error::AuthError;

/// Cache handles keyed by slot name.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    slots: BTreeMap<String, Arc<dyn Cache>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a slot, replacing any previous one with the same name.
    pub fn with_slot(mut self, name: impl Into<String>, cache: Arc<dyn Cache>) -> Self {
        self.insert(name, cache);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, cache: Arc<dyn Cache>) {
        self.slots.insert(name.into(), cache);
    }

    /// The cache behind slot `name`.
    ///
    /// # Errors
    ///
    /// Returns `CacheNotConfigured` if no slot has that name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Cache>, AuthError> {
        self.slots
            .get(name)
            .cloned()
            .ok_or_else(|| AuthError::CacheNotConfigured(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Builds one cache per configured slot.
    ///
    /// Redis slots connect eagerly, so an unreachable server fails here
    /// rather than on the first session write.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Cache` if a backend cannot be created and
    /// `AuthError::Config` if a slot needs a backend this build lacks.
    pub async fn from_config(config: &BridgeConfig) -> Result<Self, AuthError> {
        let mut registry = Self::new();
        for settings in config.caches.values() {
            let cache = build_cache(settings).await?;
            tracing::info!(slot = %settings.name, kind = settings.kind.label(), "Cache slot ready");
            registry.insert(settings.name.clone(), cache);
        }
        Ok(registry)
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("slots", &self.slots.keys().collect::<Vec<_>>())
            .finish()
    }
}

async fn build_cache(settings: &CacheSettings) -> Result<Arc<dyn Cache>, AuthError> {
    match &settings.kind {
        CacheKind::Memory => build_memory(settings),
        CacheKind::Redis(url) => build_redis(settings, url).await,
    }
}

#[cfg(feature = "memory")]
fn build_memory(settings: &CacheSettings) -> Result<Arc<dyn Cache>, AuthError> {
    let cache = crate::cache::MemoryCache::new(settings.max_entries)?
        .with_default_ttl(settings.default_ttl);
    Ok(Arc::new(cache))
}

#[cfg(not(feature = "memory"))]
fn build_memory(settings: &CacheSettings) -> Result<Arc<dyn Cache>, AuthError> {
    Err(AuthError::Config(format!(
        "cache slot '{}' is in-memory but the 'memory' feature is disabled",
        settings.name
    )))
}

#[cfg(feature = "redis")]
async fn build_redis(settings: &CacheSettings, url: &str) -> Result<Arc<dyn Cache>, AuthError> {
    let cache = crate::cache::RedisCache::new(url)
        .await?
        .with_default_ttl(settings.default_ttl);
    Ok(Arc::new(cache))
}

#[cfg(not(feature = "redis"))]
async fn build_redis(settings: &CacheSettings, _url: &str) -> Result<Arc<dyn Cache>, AuthError> {
    Err(AuthError::Config(format!(
        "cache slot '{}' uses Redis but the 'redis' feature is disabled",
        settings.name
    )))
}
