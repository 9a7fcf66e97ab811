mod error;
mod traits;

pub use error::{CacheError, Result};
pub use traits::Cache;
