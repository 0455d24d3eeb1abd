//! Vote ledger domain service.
//!
//! Implements the [`VoteLedger`] driving port on top of the vote repository
//! and the target catalogue. Casting is a toggle: the first cast stores the
//! requested direction, and any later cast removes the stored vote whatever
//! its direction. The ledger takes no locks; the repository's unique
//! constraint and row-count checks turn lost races into conflicts.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    VoteLedger, VotePersistenceError, VoteRepository, VoteTargetCatalogue,
    VoteTargetCatalogueError,
};
use crate::domain::{
    Error, UserId, VoteDirection, VoteOutcome, VoteRecord, VoteState, VoteTarget,
};

/// Vote ledger service implementing the [`VoteLedger`] port.
#[derive(Clone)]
pub struct VoteLedgerService<V, C> {
    votes: Arc<V>,
    catalogue: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<V, C> VoteLedgerService<V, C> {
    /// Create a service over the given stores.
    ///
    /// # Examples
    /// ```
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use qa_backend::domain::VoteLedgerService;
    /// # use qa_backend::test_support::{InMemoryVoteRepository, InMemoryVoteTargetCatalogue};
    /// let service = VoteLedgerService::new(
    ///     Arc::new(InMemoryVoteRepository::default()),
    ///     Arc::new(InMemoryVoteTargetCatalogue::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(votes: Arc<V>, catalogue: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            votes,
            catalogue,
            clock,
        }
    }
}

impl<V, C> VoteLedgerService<V, C>
where
    V: VoteRepository,
    C: VoteTargetCatalogue,
{
    fn map_vote_error(error: VotePersistenceError) -> Error {
        match error {
            VotePersistenceError::Connection { message } => {
                Error::service_unavailable(format!("vote repository unavailable: {message}"))
            }
            VotePersistenceError::Query { message } => {
                Error::internal(format!("vote repository error: {message}"))
            }
            VotePersistenceError::Conflict { message } => {
                Error::conflict(format!("vote changed concurrently: {message}"))
            }
        }
    }

    fn map_catalogue_error(error: VoteTargetCatalogueError) -> Error {
        match error {
            VoteTargetCatalogueError::Connection { message } => {
                Error::service_unavailable(format!("vote target catalogue unavailable: {message}"))
            }
            VoteTargetCatalogueError::Query { message } => {
                Error::internal(format!("vote target catalogue error: {message}"))
            }
        }
    }

    async fn ensure_target_exists(&self, target: VoteTarget) -> Result<(), Error> {
        let question_exists = self
            .catalogue
            .question_exists(target.question_id())
            .await
            .map_err(Self::map_catalogue_error)?;
        if !question_exists {
            return Err(Error::target_not_found(format!(
                "question {} does not exist",
                target.question_id()
            )));
        }

        if let Some(tag_id) = target.tag_id() {
            let tag_exists = self
                .catalogue
                .tag_exists(tag_id)
                .await
                .map_err(Self::map_catalogue_error)?;
            if !tag_exists {
                return Err(Error::target_not_found(format!(
                    "tag {tag_id} does not exist"
                )));
            }
        }
        Ok(())
    }

    async fn toggle(
        &self,
        voter: UserId,
        target: VoteTarget,
        direction: VoteDirection,
    ) -> Result<VoteState, Error> {
        let existing = self
            .votes
            .find(voter, target)
            .await
            .map_err(Self::map_vote_error)?;

        match existing {
            None => {
                let record = VoteRecord {
                    voter_id: voter,
                    target,
                    direction,
                    created_at: self.clock.utc(),
                };
                self.votes
                    .insert(&record)
                    .await
                    .map_err(Self::map_vote_error)?;
                Ok(VoteState::from(Some(direction)))
            }
            Some(stored) => {
                let removed = self
                    .votes
                    .remove(voter, target)
                    .await
                    .map_err(Self::map_vote_error)?;
                if !removed {
                    debug!(%voter, %target, "vote vanished between read and delete");
                    return Err(Error::conflict("vote changed concurrently"));
                }
                debug!(%voter, %target, stored = ?stored.direction, "vote withdrawn");
                Ok(VoteState::Neutral)
            }
        }
    }
}

#[async_trait]
impl<V, C> VoteLedger for VoteLedgerService<V, C>
where
    V: VoteRepository,
    C: VoteTargetCatalogue,
{
    async fn cast_vote(
        &self,
        voter: UserId,
        target: VoteTarget,
        direction: VoteDirection,
    ) -> Result<VoteOutcome, Error> {
        self.ensure_target_exists(target).await?;
        let state = self.toggle(voter, target, direction).await?;
        let score = self
            .votes
            .score(target)
            .await
            .map_err(Self::map_vote_error)?;
        info!(%voter, %target, ?direction, ?state, score, "vote cast");
        Ok(VoteOutcome {
            target,
            score,
            state,
        })
    }

    async fn aggregate_score(&self, target: VoteTarget) -> Result<i64, Error> {
        self.ensure_target_exists(target).await?;
        self.votes
            .score(target)
            .await
            .map_err(Self::map_vote_error)
    }

    async fn current_vote(&self, voter: UserId, target: VoteTarget) -> Result<VoteState, Error> {
        self.ensure_target_exists(target).await?;
        let record = self
            .votes
            .find(voter, target)
            .await
            .map_err(Self::map_vote_error)?;
        Ok(VoteState::from(record.map(|row| row.direction)))
    }
}

#[cfg(test)]
#[path = "vote_ledger_service_tests.rs"]
mod tests;
