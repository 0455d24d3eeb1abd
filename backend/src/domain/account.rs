//! Account and identity primitives.
//!
//! An [`Identity`] is what the rest of the system sees once a credential or
//! token has been resolved. A [`CredentialRecord`] additionally carries the
//! stored password hash and is only ever handed to the identity service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum allowed username length.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed username length.
pub const USERNAME_MAX: usize = 50;
/// Minimum allowed email length.
pub const EMAIL_MIN: usize = 5;
/// Maximum allowed email length.
pub const EMAIL_MAX: usize = 128;

/// Validation errors raised by account primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    #[error("user id must be a positive integer")]
    InvalidId,
    #[error("username must be between {min} and {max} characters")]
    UsernameLength { min: usize, max: usize },
    #[error("username must not contain whitespace")]
    UsernameWhitespace,
    #[error("email must be between {min} and {max} characters")]
    EmailLength { min: usize, max: usize },
    #[error("email must contain a single '@' with text on both sides")]
    EmailShape,
}

/// Opaque numeric account identifier assigned by the account store.
///
/// # Examples
/// ```
/// use qa_backend::domain::UserId;
///
/// let id: UserId = "7".parse().expect("numeric id");
/// assert_eq!(id.get(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier, rejecting non-positive values.
    pub fn new(raw: i64) -> Result<Self, AccountValidationError> {
        if raw <= 0 {
            return Err(AccountValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Raw identifier value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = AccountValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .parse::<i64>()
            .map_err(|_| AccountValidationError::InvalidId)?;
        Self::new(raw)
    }
}

/// Login name, unique per account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = raw.into();
        let length = raw.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(AccountValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(AccountValidationError::UsernameWhitespace);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = AccountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Contact address, unique per account and usable as a login key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    ///
    /// Only the coarse shape is checked; deliverability is not our concern.
    pub fn new(raw: impl Into<String>) -> Result<Self, AccountValidationError> {
        let raw = raw.into();
        let length = raw.chars().count();
        if !(EMAIL_MIN..=EMAIL_MAX).contains(&length) {
            return Err(AccountValidationError::EmailLength {
                min: EMAIL_MIN,
                max: EMAIL_MAX,
            });
        }
        match raw.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(raw))
            }
            _ => Err(AccountValidationError::EmailShape),
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// A resolved, authenticated actor.
///
/// # Examples
/// ```
/// use qa_backend::domain::{Identity, UserId, Username};
///
/// let identity = Identity::new(
///     UserId::new(7).expect("positive id"),
///     Username::new("alice").expect("valid username"),
/// );
/// assert_eq!(identity.id().get(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    id: UserId,
    username: Username,
}

impl Identity {
    /// Build an identity from its parts.
    pub fn new(id: UserId, username: Username) -> Self {
        Self { id, username }
    }

    /// Stable account identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Login name.
    pub fn username(&self) -> &Username {
        &self.username
    }
}

/// Encoded one-way password hash (PHC string format).
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by the password hasher or read from
    /// storage.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded PHC string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Stored account as seen by the login path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    identity: Identity,
    email: EmailAddress,
    password_hash: PasswordHash,
}

impl CredentialRecord {
    /// Build a record from its parts.
    pub fn new(identity: Identity, email: EmailAddress, password_hash: PasswordHash) -> Self {
        Self {
            identity,
            email,
            password_hash,
        }
    }

    /// Identity the record resolves to.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Registered email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Stored password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Consume the record, keeping only the identity.
    pub fn into_identity(self) -> Identity {
        self.identity
    }
}

/// Account ready to be inserted; the store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
}
