//! Pretty output formatting.

use oidcache_core::session::SessionAttribute;

use super::{AccountView, Presence, SessionList, SessionView};

/// Format a session for display.
pub fn format_session(session: &SessionView) -> String {
    let mut output = format!("SESSION {}", session.sid);
    if session.attributes.is_empty() {
        output.push_str("\n  (no attributes)");
    }
    for (name, value) in &session.attributes {
        let value = match value {
            SessionAttribute::Text(text) => format!("{text:?}"),
            SessionAttribute::Flag(flag) => flag.to_string(),
        };
        output.push_str(&format!("\n  {name}: {value}"));
    }
    if let Some(key) = &session.rsa_key {
        output.push_str(&format!("\n  RSA key: {} ({} bits)", key.kind, key.bits));
    }
    output
}

pub fn format_presence(presence: &Presence) -> String {
    if presence.present {
        format!("Session {} is stored", presence.sid)
    } else {
        format!("Session {} is not stored", presence.sid)
    }
}

/// Format session keys for display.
pub fn format_sessions(list: &SessionList) -> String {
    if list.sids.is_empty() {
        return "No sessions found.".to_string();
    }
    let mut output = format!("SESSIONS ({})\n", list.sids.len());
    output.push_str(&"-".repeat(40));
    for sid in &list.sids {
        output.push_str(&format!("\n{sid}"));
    }
    output
}

/// Format a resolved account for display.
pub fn format_account(account: &AccountView) -> String {
    let status = if account.created { "Created" } else { "Existing" };
    format!(
        "{status}: {}\n  ID: {}\n  Email: {}\n  Backend: {}",
        account.username, account.id, account.email, account.backend
    )
}
