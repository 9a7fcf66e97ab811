use oidcache_core::cache::CacheError;
use oidcache_core::storage::RepositoryError;
use thiserror::Error;

/// Auth errors for the oidcache_auth crate.
///
/// This wraps the core `AuthError` and adds the variants that come from
/// wiring: configuration and cache slot lookup.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (missing claims, storage).
    #[error(transparent)]
    Core(#[from] oidcache_core::auth::AuthError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider not configured
    #[error("provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// Cache slot not configured
    #[error("cache slot not configured: {0}")]
    CacheNotConfigured(String),

    /// Cache backend could not be created
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        AuthError::Core(err.into())
    }
}
