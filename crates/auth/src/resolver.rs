//! Find-or-create of local accounts from OIDC claims.

use std::sync::Arc;

use openidconnect::{AdditionalClaims, GenderClaim, IdTokenClaims};

use oidcache_core::auth::{Account, AuthenticatedAccount, ClaimSet, EMAIL_CLAIM, SUBJECT_CLAIM};
use oidcache_core::storage::{RepositoryError, UserRepository};

use crate::error::AuthError;

/// Backend identifier attached to resolved accounts by default.
pub const MODEL_BACKEND: &str = "oidcache.backends.ModelBackend";

/// Resolves validated OIDC claims to a local account keyed by email.
///
/// The first login with an email creates the account; later logins reuse
/// it. If two first logins race, the repository's uniqueness constraint
/// rejects the loser, which then re-reads and returns the winner's account.
#[derive(Clone)]
pub struct UserResolver {
    users: Arc<dyn UserRepository>,
    backend: String,
}

impl UserResolver {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            backend: MODEL_BACKEND.to_string(),
        }
    }

    /// Overrides the backend identifier attached to results.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Finds or creates the account for the `email` claim.
    ///
    /// # Errors
    ///
    /// - `MissingClaim("email")` if the claim set has no email
    /// - repository errors other than a lost creation race
    pub async fn resolve(&self, claims: &ClaimSet) -> Result<AuthenticatedAccount, AuthError> {
        let email = claims.email()?;
        let (account, created) = self.find_or_create(email).await?;

        Ok(AuthenticatedAccount {
            account,
            backend: self.backend.clone(),
            created,
        })
    }

    /// Converts ID token claims with [`claims_from_id_token`] and resolves them.
    pub async fn resolve_id_token<AC, GC>(
        &self,
        claims: &IdTokenClaims<AC, GC>,
    ) -> Result<AuthenticatedAccount, AuthError>
    where
        AC: AdditionalClaims,
        GC: GenderClaim,
    {
        self.resolve(&claims_from_id_token(claims)).await
    }

    async fn find_or_create(&self, email: &str) -> Result<(Account, bool), AuthError> {
        if let Some(account) = self.users.get_user_by_email(email).await? {
            tracing::debug!(account_id = %account.id, "Existing account resolved");
            return Ok((account, false));
        }

        let account = Account::new(email);
        match self.users.create_user(&account).await {
            Ok(()) => {
                tracing::info!(account_id = %account.id, username = %account.username, "Account created");
                Ok((account, true))
            }
            Err(RepositoryError::AlreadyExists { .. }) => {
                tracing::debug!("Account created concurrently, re-reading");
                let account = self
                    .users
                    .get_user_by_email(email)
                    .await?
                    .ok_or_else(|| RepositoryError::NotFound {
                        entity_type: "Account",
                        id: email.to_string(),
                    })?;
                Ok((account, false))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for UserResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserResolver")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

/// Copies the identity claims the resolver and session index care about.
///
/// Only the default-locale `name` is taken. `email_verified` becomes
/// `"true"` or `"false"`.
pub fn claims_from_id_token<AC, GC>(claims: &IdTokenClaims<AC, GC>) -> ClaimSet
where
    AC: AdditionalClaims,
    GC: GenderClaim,
{
    let mut set = ClaimSet::new()
        .with(SUBJECT_CLAIM, claims.subject().to_string())
        .with("iss", claims.issuer().as_str());

    if let Some(email) = claims.email() {
        set.insert(EMAIL_CLAIM, email.to_string());
    }
    if let Some(verified) = claims.email_verified() {
        set.insert("email_verified", verified.to_string());
    }
    if let Some(name) = claims.name().and_then(|n| n.get(None)) {
        set.insert("name", name.to_string());
    }
    if let Some(username) = claims.preferred_username() {
        set.insert("preferred_username", username.to_string());
    }

    set
}
