mod error;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use traits::{SessionIndexRepository, UserRepository};
pub use types::SessionBinding;
