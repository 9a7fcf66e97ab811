//! Functional core for oidcache.
//!
//! Pure types, traits and error enums shared by the session store and the
//! user resolver. Nothing in this crate performs I/O; the `oidcache_auth`
//! crate provides the implementations that talk to caches and databases.

pub mod auth;
pub mod cache;
pub mod session;
pub mod storage;
