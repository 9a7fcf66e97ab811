mod error;
mod functions;
mod types;

pub use error::{AuthError, Result};
pub use functions::email_to_name;
pub use types::{Account, AuthenticatedAccount, ClaimSet, EMAIL_CLAIM, SUBJECT_CLAIM};
