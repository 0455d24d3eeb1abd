//! Authentication inputs: login credentials, registrations, and the places a
//! token may arrive from.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::{AccountValidationError, EmailAddress, Username};

/// Minimum allowed password length at registration.
pub const PASSWORD_MIN: usize = 8;
/// Maximum allowed password length at registration.
pub const PASSWORD_MAX: usize = 128;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username or email was missing or blank once trimmed.
    EmptyIdentifier,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyIdentifier => write!(f, "username or email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `identifier` is trimmed and non-empty; it is matched against both the
///   username and the email of stored accounts.
/// - `password` is non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use qa_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "hunter22").unwrap();
/// assert_eq!(creds.identifier(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw identifier/password inputs.
    pub fn try_from_parts(identifier: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = identifier.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyIdentifier);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            identifier: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username or email used for the account lookup.
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validation errors raised for registration payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error(transparent)]
    Account(#[from] AccountValidationError),
    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate raw sign-up inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username.trim())?;
        let email = EmailAddress::new(email.trim())?;
        let length = password.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(RegistrationValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Where a request may carry an access token.
///
/// The cookie wins when both are present.
///
/// # Examples
/// ```
/// use qa_backend::domain::CredentialSource;
///
/// let source = CredentialSource::new(Some("from-cookie".into()), Some("from-header".into()));
/// assert_eq!(source.token(), Some("from-cookie"));
/// assert!(CredentialSource::anonymous().token().is_none());
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSource {
    cookie: Option<String>,
    bearer: Option<String>,
}

impl CredentialSource {
    /// Build a source from the raw cookie value and bearer header token.
    pub fn new(cookie: Option<String>, bearer: Option<String>) -> Self {
        Self { cookie, bearer }
    }

    /// A request with no credentials at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The token to verify, if any. Blank values count as absent.
    pub fn token(&self) -> Option<&str> {
        non_blank(self.cookie.as_deref()).or_else(|| non_blank(self.bearer.as_deref()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|token| !token.is_empty())
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSource")
            .field("cookie", &self.cookie.is_some())
            .field("bearer", &self.bearer.is_some())
            .finish()
    }
}
