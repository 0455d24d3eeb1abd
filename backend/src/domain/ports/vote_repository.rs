//! Port for vote row storage.
//!
//! The store holds at most one row per (voter, target). Adapters back this
//! with a unique constraint so that a racing second insert surfaces as
//! [`VotePersistenceError::Conflict`] rather than a duplicate row.

use async_trait::async_trait;

use crate::domain::{UserId, VoteRecord, VoteTarget};

use super::define_port_error;

define_port_error! {
    /// Errors raised by vote repository adapters.
    pub enum VotePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "vote repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "vote repository query failed: {message}",
        /// A concurrent writer already changed the row being touched.
        Conflict { message: String } => "vote row changed concurrently: {message}",
    }
}

/// Storage for per-voter vote rows and their aggregate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Fetch the voter's current row for `target`, if any.
    async fn find(
        &self,
        voter: UserId,
        target: VoteTarget,
    ) -> Result<Option<VoteRecord>, VotePersistenceError>;

    /// Store a new row.
    ///
    /// Fails with [`VotePersistenceError::Conflict`] when a row for the same
    /// (voter, target) already exists.
    async fn insert(&self, record: &VoteRecord) -> Result<(), VotePersistenceError>;

    /// Delete the voter's row for `target`, returning whether a row was
    /// removed.
    async fn remove(&self, voter: UserId, target: VoteTarget) -> Result<bool, VotePersistenceError>;

    /// Signed sum of every stored direction for `target`; zero when empty.
    async fn score(&self, target: VoteTarget) -> Result<i64, VotePersistenceError>;
}
