use serde::{Deserialize, Serialize};

/// One row of the session index: which login session belongs to which
/// user and which provider subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBinding {
    /// Session key, as stored in the cache.
    pub sid: String,
    /// Local user identifier.
    pub uid: String,
    /// Subject asserted by the identity provider.
    pub sub: String,
}

impl SessionBinding {
    pub fn new(sid: impl Into<String>, uid: impl Into<String>, sub: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            uid: uid.into(),
            sub: sub.into(),
        }
    }
}
