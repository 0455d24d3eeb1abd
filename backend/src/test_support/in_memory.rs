//! In-memory implementations of the driven ports.
//!
//! They honour the same contracts as the Diesel adapters: one vote row per
//! (voter, target), duplicate inserts surface as conflicts, and usernames and
//! emails are unique.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    AccountPersistenceError, AccountRepository, VotePersistenceError, VoteRepository,
    VoteTargetCatalogue, VoteTargetCatalogueError,
};
use crate::domain::{
    CredentialRecord, Identity, NewAccount, QuestionId, TagId, UserId, VoteRecord, VoteTarget,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Vote rows keyed by (voter, target).
#[derive(Debug, Default)]
pub struct InMemoryVoteRepository {
    rows: Mutex<HashMap<(UserId, VoteTarget), VoteRecord>>,
}

impl InMemoryVoteRepository {
    /// Number of stored rows across every target.
    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn find(
        &self,
        voter: UserId,
        target: VoteTarget,
    ) -> Result<Option<VoteRecord>, VotePersistenceError> {
        Ok(lock(&self.rows).get(&(voter, target)).cloned())
    }

    async fn insert(&self, record: &VoteRecord) -> Result<(), VotePersistenceError> {
        let mut rows = lock(&self.rows);
        let key = (record.voter_id, record.target);
        if rows.contains_key(&key) {
            return Err(VotePersistenceError::conflict(format!(
                "voter {} already voted on {}",
                record.voter_id, record.target
            )));
        }
        rows.insert(key, record.clone());
        Ok(())
    }

    async fn remove(&self, voter: UserId, target: VoteTarget) -> Result<bool, VotePersistenceError> {
        Ok(lock(&self.rows).remove(&(voter, target)).is_some())
    }

    async fn score(&self, target: VoteTarget) -> Result<i64, VotePersistenceError> {
        Ok(lock(&self.rows)
            .values()
            .filter(|row| row.target == target)
            .map(|row| i64::from(row.direction.value()))
            .sum())
    }
}

/// Known questions and tags.
#[derive(Debug, Default)]
pub struct InMemoryVoteTargetCatalogue {
    questions: Mutex<HashSet<QuestionId>>,
    tags: Mutex<HashSet<TagId>>,
}

impl InMemoryVoteTargetCatalogue {
    #[must_use]
    pub fn with_question(self, id: i64) -> Self {
        lock(&self.questions).insert(QuestionId::new(id));
        self
    }

    #[must_use]
    pub fn with_tag(self, id: i64) -> Self {
        lock(&self.tags).insert(TagId::new(id));
        self
    }
}

#[async_trait]
impl VoteTargetCatalogue for InMemoryVoteTargetCatalogue {
    async fn question_exists(&self, id: QuestionId) -> Result<bool, VoteTargetCatalogueError> {
        Ok(lock(&self.questions).contains(&id))
    }

    async fn tag_exists(&self, id: TagId) -> Result<bool, VoteTargetCatalogueError> {
        Ok(lock(&self.tags).contains(&id))
    }
}

/// Accounts with sequentially assigned identifiers starting at 1.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<Vec<CredentialRecord>>,
}

impl InMemoryAccountRepository {
    /// Drop an account, simulating deletion after a token was issued.
    pub fn delete(&self, id: UserId) {
        lock(&self.accounts).retain(|record| record.identity().id() != id);
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn account_by_identifier(
        &self,
        username_or_email: &str,
    ) -> Result<Option<CredentialRecord>, AccountPersistenceError> {
        let accounts = lock(&self.accounts);
        let by_username = accounts
            .iter()
            .find(|record| record.identity().username().as_ref() == username_or_email);
        let found = by_username.or_else(|| {
            accounts
                .iter()
                .find(|record| record.email().as_ref() == username_or_email)
        });
        Ok(found.cloned())
    }

    async fn account_by_id(&self, id: UserId) -> Result<Option<Identity>, AccountPersistenceError> {
        Ok(lock(&self.accounts)
            .iter()
            .find(|record| record.identity().id() == id)
            .map(|record| record.identity().clone()))
    }

    async fn insert_account(&self, account: &NewAccount) -> Result<Identity, AccountPersistenceError> {
        let mut accounts = lock(&self.accounts);
        let taken = accounts.iter().any(|record| {
            record.identity().username() == &account.username || record.email() == &account.email
        });
        if taken {
            return Err(AccountPersistenceError::duplicate(format!(
                "username '{}' or its email is taken",
                account.username
            )));
        }
        let next_id = accounts
            .iter()
            .map(|record| record.identity().id().get())
            .max()
            .unwrap_or(0)
            + 1;
        let id = UserId::new(next_id)
            .map_err(|err| AccountPersistenceError::query(err.to_string()))?;
        let identity = Identity::new(id, account.username.clone());
        accounts.push(CredentialRecord::new(
            identity.clone(),
            account.email.clone(),
            account.password_hash.clone(),
        ));
        Ok(identity)
    }
}
