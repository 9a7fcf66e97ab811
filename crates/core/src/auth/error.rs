use thiserror::Error;

use crate::storage::RepositoryError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing required claim: {0}")]
    MissingClaim(String),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, AuthError>;
