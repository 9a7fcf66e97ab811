use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{email_to_name, AuthError, Result};

/// Claim holding the end user's email address.
pub const EMAIL_CLAIM: &str = "email";

/// Claim holding the provider's subject identifier.
pub const SUBJECT_CLAIM: &str = "sub";

/// Claims taken from a validated ID token or userinfo response.
///
/// Validation happens upstream in the OIDC client; this is just the
/// name → value view the resolver works with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(BTreeMap<String, String>);

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a claim, replacing any previous value with the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns the claim value or `AuthError::MissingClaim`.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)
            .ok_or_else(|| AuthError::MissingClaim(name.to_string()))
    }

    pub fn email(&self) -> Result<&str> {
        self.require(EMAIL_CLAIM)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get(SUBJECT_CLAIM)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for ClaimSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Local user account, unique by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new account for the given email. The username is the
    /// local part of the address.
    pub fn new(email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            id: Uuid::new_v4(),
            username: email_to_name(&email),
            email,
            created_at: Utc::now(),
        }
    }

    /// Sets a specific ID for this account (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// An account handed to the application's login machinery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedAccount {
    pub account: Account,
    /// Identifier of the authentication backend the account is attributed to.
    pub backend: String,
    /// Whether this resolution created the account.
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_set_get_and_require() {
        let claims = ClaimSet::new()
            .with("email", "alice@example.com")
            .with("sub", "abc");

        assert_eq!(claims.get("email"), Some("alice@example.com"));
        assert_eq!(claims.email().unwrap(), "alice@example.com");
        assert_eq!(claims.subject(), Some("abc"));
        assert_eq!(claims.len(), 2);
    }

    #[test]
    fn claim_set_missing_email_is_missing_claim() {
        let claims = ClaimSet::new().with("sub", "abc");

        match claims.email() {
            Err(AuthError::MissingClaim(name)) => assert_eq!(name, "email"),
            other => panic!("expected MissingClaim, got {:?}", other),
        }
    }

    #[test]
    fn claim_set_from_iterator_and_serde_is_a_plain_map() {
        let claims: ClaimSet = [("email", "bob@example.com"), ("name", "Bob")]
            .into_iter()
            .collect();

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"email": "bob@example.com", "name": "Bob"})
        );
    }

    #[test]
    fn account_new_derives_username() {
        let account = Account::new("alice@example.com");
        assert_eq!(account.email, "alice@example.com");
        assert_eq!(account.username, "alice");
    }

    #[test]
    fn account_with_id_overrides_generated_id() {
        let id = Uuid::nil();
        let account = Account::new("alice@example.com").with_id(id);
        assert_eq!(account.id, id);
    }
}
