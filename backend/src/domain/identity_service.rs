//! Identity domain service: login, token issuance, request resolution, and
//! account registration.
//!
//! Every resolution goes through [`IdentityService::resolve`], which classifies
//! a request as identified, anonymous, or rejected. The optional and required
//! entry points differ only in how they report the last two outcomes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, error, info};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountPersistenceError, AccountRegistration, AccountRepository, CredentialHasher,
    IdentityResolver,
};
use crate::domain::{
    AccessToken, Claims, CredentialSource, Error, Identity, LoginCredentials, NewAccount,
    Registration, TokenCodec, TokenError, UserId,
};

/// Default lifetime of an access token.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Default lifetime of an access token as a [`Duration`].
#[must_use]
pub fn default_token_ttl() -> Duration {
    Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES)
}

/// Why a presented token did not resolve to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Malformed,
    UnsupportedAlgorithm,
    BadSignature,
    Expired,
    /// The token verified but names an account that no longer exists.
    UnknownSubject,
}

impl From<TokenError> for TokenRejection {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Malformed => Self::Malformed,
            TokenError::UnsupportedAlgorithm => Self::UnsupportedAlgorithm,
            TokenError::BadSignature => Self::BadSignature,
            TokenError::Expired => Self::Expired,
        }
    }
}

/// Outcome of resolving a request's credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Identified(Identity),
    /// No token was presented.
    Anonymous,
    Rejected(TokenRejection),
}

/// Identity service implementing [`IdentityResolver`] and
/// [`AccountRegistration`].
#[derive(Clone)]
pub struct IdentityService<A> {
    accounts: Arc<A>,
    passwords: Arc<dyn CredentialHasher>,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
}

impl<A> IdentityService<A> {
    pub fn new(
        accounts: Arc<A>,
        passwords: impl CredentialHasher + 'static,
        codec: TokenCodec,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            passwords: Arc::new(passwords),
            codec,
            clock,
        }
    }

    /// Run a hashing call on the blocking pool.
    async fn with_hasher<T, F>(&self, task: F) -> Result<T, Error>
    where
        F: FnOnce(&dyn CredentialHasher) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
    {
        let hasher = Arc::clone(&self.passwords);
        tokio::task::spawn_blocking(move || task(hasher.as_ref()))
            .await
            .map_err(|err| {
                error!(error = %err, "password hashing task failed");
                Error::internal("password hashing failed")
            })?
    }
}

impl<A> IdentityService<A>
where
    A: AccountRepository,
{
    fn map_account_error(error: AccountPersistenceError) -> Error {
        match error {
            AccountPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("account repository unavailable: {message}"))
            }
            AccountPersistenceError::Query { message } => {
                Error::internal(format!("account repository error: {message}"))
            }
            AccountPersistenceError::Duplicate { .. } => Error::conflict("account already exists")
                .with_details(json!({ "code": "account_exists" })),
        }
    }

    /// Classify the credentials carried by a request.
    ///
    /// Only infrastructure failures while looking up the subject are errors.
    pub async fn resolve(&self, source: &CredentialSource) -> Result<Resolution, Error> {
        let Some(token) = source.token() else {
            return Ok(Resolution::Anonymous);
        };

        let claims = match self.codec.verify(token, self.clock.utc()) {
            Ok(claims) => claims,
            Err(err) => return Ok(Resolution::Rejected(err.into())),
        };

        let Ok(subject) = claims.sub.parse::<UserId>() else {
            return Ok(Resolution::Rejected(TokenRejection::Malformed));
        };

        let identity = self
            .accounts
            .account_by_id(subject)
            .await
            .map_err(Self::map_account_error)?;
        Ok(match identity {
            Some(identity) => Resolution::Identified(identity),
            None => Resolution::Rejected(TokenRejection::UnknownSubject),
        })
    }
}

#[async_trait]
impl<A> IdentityResolver for IdentityService<A>
where
    A: AccountRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Identity, Error> {
        let record = self
            .accounts
            .account_by_identifier(credentials.identifier())
            .await
            .map_err(Self::map_account_error)?;

        let stored = record.as_ref().map(|found| found.password_hash().clone());
        let password = Zeroizing::new(credentials.password().to_owned());
        let verified = self
            .with_hasher(move |hasher| hasher.verify(password.as_str(), stored.as_ref()))
            .await?;

        match record {
            Some(found) if verified => {
                let identity = found.into_identity();
                info!(user_id = %identity.id(), "login succeeded");
                Ok(identity)
            }
            _ => {
                debug!("login rejected");
                Err(Error::invalid_credentials("invalid username or password"))
            }
        }
    }

    fn issue_token(&self, identity: &Identity, ttl: Duration) -> Result<AccessToken, Error> {
        if ttl <= Duration::zero() {
            return Err(Error::invalid_request("token lifetime must be positive"));
        }
        let issued_at = self.clock.utc();
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| Error::invalid_request("token lifetime too large"))?;
        let claims = Claims {
            sub: identity.id().to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let value = self.codec.sign(&claims)?;
        Ok(AccessToken::new(value, expires_at))
    }

    async fn resolve_optional(&self, source: &CredentialSource) -> Result<Option<Identity>, Error> {
        match self.resolve(source).await? {
            Resolution::Identified(identity) => Ok(Some(identity)),
            Resolution::Anonymous => Ok(None),
            Resolution::Rejected(reason) => {
                debug!(?reason, "token ignored for optional identity");
                Ok(None)
            }
        }
    }

    async fn resolve_required(&self, source: &CredentialSource) -> Result<Identity, Error> {
        match self.resolve(source).await? {
            Resolution::Identified(identity) => Ok(identity),
            Resolution::Anonymous => Err(Error::unauthenticated("authentication required")),
            Resolution::Rejected(reason) => {
                debug!(?reason, "token rejected for required identity");
                Err(Error::unauthenticated("invalid or expired token"))
            }
        }
    }
}

#[async_trait]
impl<A> AccountRegistration for IdentityService<A>
where
    A: AccountRepository,
{
    async fn register(&self, registration: &Registration) -> Result<Identity, Error> {
        let password = Zeroizing::new(registration.password().to_owned());
        let password_hash = self
            .with_hasher(move |hasher| hasher.hash(password.as_str()))
            .await?;
        let account = NewAccount {
            username: registration.username().clone(),
            email: registration.email().clone(),
            password_hash,
        };
        let identity = self
            .accounts
            .insert_account(&account)
            .await
            .map_err(Self::map_account_error)?;
        info!(user_id = %identity.id(), "account registered");
        Ok(identity)
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
