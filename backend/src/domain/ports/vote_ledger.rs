//! Driving port for casting and reading votes.
//!
//! Inbound adapters depend on this trait rather than on the ledger service so
//! handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, UserId, VoteDirection, VoteOutcome, VoteState, VoteTarget};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteLedger: Send + Sync {
    /// Toggle the voter's vote on `target`.
    ///
    /// With no stored vote, stores `direction`. With any stored vote, removes
    /// it whatever its direction, leaving the voter neutral.
    async fn cast_vote(
        &self,
        voter: UserId,
        target: VoteTarget,
        direction: VoteDirection,
    ) -> Result<VoteOutcome, Error>;

    /// Signed sum of stored directions for `target`.
    async fn aggregate_score(&self, target: VoteTarget) -> Result<i64, Error>;

    /// Where `voter` currently stands on `target`.
    async fn current_vote(&self, voter: UserId, target: VoteTarget) -> Result<VoteState, Error>;
}
