//! Driving port for login, token issuance, and per-request identity
//! resolution.

use async_trait::async_trait;
use chrono::Duration;

use crate::domain::{AccessToken, CredentialSource, Error, Identity, LoginCredentials};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Check a username-or-email and password pair.
    ///
    /// Unknown accounts and wrong passwords fail identically with
    /// [`crate::domain::ErrorCode::InvalidCredentials`].
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Identity, Error>;

    /// Sign a token for `identity` valid for `ttl` from now.
    fn issue_token(&self, identity: &Identity, ttl: Duration) -> Result<AccessToken, Error>;

    /// Resolve the caller if a valid token is present.
    ///
    /// Missing, malformed, forged, or expired tokens and tokens for deleted
    /// accounts all yield `Ok(None)`. Only infrastructure failures are errors.
    async fn resolve_optional(&self, source: &CredentialSource) -> Result<Option<Identity>, Error>;

    /// Resolve the caller, failing with
    /// [`crate::domain::ErrorCode::Unauthenticated`] when no valid token is
    /// present.
    async fn resolve_required(&self, source: &CredentialSource) -> Result<Identity, Error>;
}
