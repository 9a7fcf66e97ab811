//! Cache backend implementations.
//!
//! Concrete implementations of [`oidcache_core::cache::Cache`]. Each backend
//! sits behind its own feature flag; both may be enabled at once since every
//! named cache slot picks its own backend.
//!
//! # Feature Flags
//!
//! - `memory` (default): in-process LRU cache using tokio synchronization primitives
//! - `redis`: Redis cache using the redis crate

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "redis")]
mod redis_impl;

#[cfg(feature = "memory")]
pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
