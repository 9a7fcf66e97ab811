//! oidcache_cli - admin CLI for oidcache session caches and accounts.

pub mod cli;
pub mod commands;
pub mod output;

pub use commands::Context;
