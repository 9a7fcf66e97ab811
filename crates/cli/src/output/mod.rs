//! Output formatting functions.

pub mod pretty;

use std::collections::BTreeMap;

use serde::Serialize;

use oidcache_core::auth::AuthenticatedAccount;
use oidcache_core::session::{SessionAttribute, SessionValue};

use crate::cli::OutputFormat;

/// Format a value for output.
pub fn format_output<T: Serialize>(value: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(value).unwrap_or_default(),
        OutputFormat::Pretty => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// Printable view of a stored session. Key material is summarized, never printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub sid: String,
    pub attributes: BTreeMap<String, SessionAttribute>,
    pub rsa_key: Option<KeySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySummary {
    pub kind: &'static str,
    pub bits: usize,
}

impl SessionView {
    pub fn new(sid: impl Into<String>, value: &SessionValue) -> Self {
        Self {
            sid: sid.into(),
            attributes: value.attributes.clone(),
            rsa_key: value.rsa_key.as_ref().map(|key| KeySummary {
                kind: if key.is_private() { "private" } else { "public" },
                bits: key.bits(),
            }),
        }
    }
}

/// Result of `session contains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presence {
    pub sid: String,
    pub present: bool,
}

/// Result of `session by-uid` / `session by-sub`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionList {
    pub sids: Vec<String>,
}

/// Printable view of a resolved account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub id: String,
    pub email: String,
    pub username: String,
    pub created_at: String,
    pub backend: String,
    pub created: bool,
}

impl From<&AuthenticatedAccount> for AccountView {
    fn from(resolved: &AuthenticatedAccount) -> Self {
        Self {
            id: resolved.account.id.to_string(),
            email: resolved.account.email.clone(),
            username: resolved.account.username.clone(),
            created_at: resolved.account.created_at.to_rfc3339(),
            backend: resolved.backend.clone(),
            created: resolved.created,
        }
    }
}
