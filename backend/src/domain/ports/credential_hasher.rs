//! Driven port for one-way password hashing.

use crate::domain::{Error, PasswordHash};

/// Hashes and checks account passwords.
///
/// Implementations are CPU-bound and blocking; services call them off the
/// async worker threads.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash `password` with a fresh random salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, Error>;

    /// Check `password` against `stored`.
    ///
    /// `None` means no account matched. Implementations still perform a full
    /// verification against a throwaway hash and return `false`.
    fn verify<'a>(&self, password: &str, stored: Option<&'a PasswordHash>) -> Result<bool, Error>;
}
