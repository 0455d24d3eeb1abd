//! Driving port for creating accounts.

use async_trait::async_trait;

use crate::domain::{Error, Identity, Registration};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRegistration: Send + Sync {
    /// Create an account, failing with
    /// [`crate::domain::ErrorCode::Conflict`] when the username or email is
    /// taken.
    async fn register(&self, registration: &Registration) -> Result<Identity, Error>;
}
