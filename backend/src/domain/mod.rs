//! Domain primitives, services, and ports.
//!
//! Purpose: define the vote ledger and identity resolver independently of
//! HTTP and PostgreSQL. Inbound adapters call the driving ports in
//! [`ports`]; outbound adapters implement the driven ones.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Vote types: VoteTarget, VoteDirection, VoteState, VoteOutcome.
//! - Identity types: UserId, Identity, CredentialSource, AccessToken.
//! - Services: VoteLedgerService, IdentityService.

pub mod account;
pub mod auth;
pub mod error;
pub mod identity_service;
pub mod password;
pub mod ports;
pub mod token;
pub mod trace_id;
pub mod vote;
pub mod vote_ledger_service;

pub use self::account::{
    AccountValidationError, CredentialRecord, EmailAddress, Identity, NewAccount, PasswordHash,
    UserId, Username,
};
pub use self::auth::{
    CredentialSource, LoginCredentials, LoginValidationError, Registration,
    RegistrationValidationError,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity_service::{
    DEFAULT_TOKEN_TTL_MINUTES, IdentityService, Resolution, TokenRejection, default_token_ttl,
};
pub use self::password::Argon2Passwords;
pub use self::token::{
    AccessToken, Claims, TOKEN_SECRET_MIN_LEN, TokenCodec, TokenError, TokenSecret,
    TokenSecretError,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::vote::{
    QuestionId, TagId, VoteDirection, VoteDirectionError, VoteOutcome, VoteRecord, VoteState,
    VoteTarget,
};
pub use self::vote_ledger_service::VoteLedgerService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use qa_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::unauthenticated("login required"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
