//! Account and session index storage.
//!
//! Provides `UserRepository` + `SessionIndexRepository` implementations for:
//! - In-memory (with `inmemory` feature)
//! - SQLite (with `sqlite` feature)

#[cfg(feature = "inmemory")]
mod inmemory;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
