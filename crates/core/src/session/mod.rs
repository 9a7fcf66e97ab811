//! Session values and the contract a session backend fulfils.
//!
//! A session value is a flat record of named text/boolean attributes plus an
//! optional RSA key. [`encode_session`] and [`decode_session`] turn it into a
//! versioned JSON document for storage in any [`crate::cache::Cache`].

mod codec;
mod error;
mod key;
mod traits;
mod types;

pub use codec::{decode_session, encode_session, FORMAT_VERSION};
pub use error::{CodecError, Result, SessionError};
pub use key::RsaKeyMaterial;
pub use traits::SessionBackend;
pub use types::{SessionAttribute, SessionValue};
