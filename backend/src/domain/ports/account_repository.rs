//! Port abstraction for account persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{CredentialRecord, Identity, NewAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by account repository adapters.
    pub enum AccountPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// Username or email already belongs to another account.
        Duplicate { message: String } => "account already exists: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Look an account up by username or, failing that, by email.
    async fn account_by_identifier(
        &self,
        username_or_email: &str,
    ) -> Result<Option<CredentialRecord>, AccountPersistenceError>;

    /// Fetch the identity for a stored account.
    async fn account_by_id(&self, id: UserId) -> Result<Option<Identity>, AccountPersistenceError>;

    /// Store a new account and return its assigned identity.
    ///
    /// Fails with [`AccountPersistenceError::Duplicate`] when the username or
    /// email is already taken.
    async fn insert_account(&self, account: &NewAccount) -> Result<Identity, AccountPersistenceError>;
}
