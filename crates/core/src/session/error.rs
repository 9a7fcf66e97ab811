use thiserror::Error;

use crate::cache::CacheError;
use crate::storage::RepositoryError;

/// Errors raised while encoding or decoding a stored session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Failed to serialize session: {0}")]
    Serialize(String),
    #[error("Failed to deserialize session: {0}")]
    Deserialize(String),
    #[error("Invalid RSA key material: {0}")]
    InvalidKey(String),
    #[error("Unsupported session format version: {0}")]
    UnsupportedVersion(u32),
}

/// Errors surfaced by a [`super::SessionBackend`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No session is stored under the key.
    #[error("session not found: {0}")]
    NotFound(String),

    /// The backend does not support the requested lookup.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Index(#[from] RepositoryError),
}

/// Result type for session backend operations.
pub type Result<T> = std::result::Result<T, SessionError>;
