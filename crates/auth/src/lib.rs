//! OIDC session storage and user resolution for oidcache.
//!
//! This crate provides:
//! - `UserResolver`: find-or-create of local accounts by the `email` claim
//! - `CacheSessionBackend`: OIDC session state kept in a named cache slot
//! - Cache backends (in-memory LRU or Redis via feature flags)
//! - Account and session index storage (in-memory or SQLite via feature flags)

pub mod cache;
mod backend;
mod config;
mod error;
mod registry;
mod resolver;
pub mod storage;

pub use backend::CacheSessionBackend;
pub use config::{
    BridgeConfig, CacheKind, CacheSettings, ProviderSettings, DEFAULT_CACHE_BACKEND,
    DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_SCOPE,
};
pub use error::AuthError;
pub use registry::CacheRegistry;
pub use resolver::{claims_from_id_token, UserResolver, MODEL_BACKEND};
