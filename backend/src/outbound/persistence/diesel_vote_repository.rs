//! PostgreSQL-backed `VoteRepository` implementation using Diesel ORM.
//!
//! Question votes and question/tag votes live in separate tables, each with a
//! unique constraint over the voter and target columns. A racing second insert
//! therefore fails with a unique violation, which is reported as
//! [`VotePersistenceError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{VotePersistenceError, VoteRepository};
use crate::domain::{UserId, VoteDirection, VoteRecord, VoteTarget};

use super::diesel_basic_error_mapping::{
    ErrorConstructors, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewQuestionTagVoteRow, NewQuestionVoteRow};
use super::pool::{DbPool, PoolError};
use super::schema::{question_tag_votes, question_votes};

/// Diesel-backed implementation of the `VoteRepository` port.
#[derive(Clone)]
pub struct DieselVoteRepository {
    pool: DbPool,
}

impl DieselVoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> VotePersistenceError {
    map_basic_pool_error(error, VotePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> VotePersistenceError {
    map_basic_diesel_error(
        error,
        ErrorConstructors {
            query: VotePersistenceError::query,
            connection: VotePersistenceError::connection,
            unique: VotePersistenceError::conflict,
        },
    )
}

fn row_to_record(
    voter_id: UserId,
    target: VoteTarget,
    (vote, created_at): (i16, DateTime<Utc>),
) -> Result<VoteRecord, VotePersistenceError> {
    let direction = VoteDirection::try_from(vote)
        .map_err(|err| VotePersistenceError::query(format!("stored vote is invalid: {err}")))?;
    Ok(VoteRecord {
        voter_id,
        target,
        direction,
        created_at,
    })
}

#[async_trait]
impl VoteRepository for DieselVoteRepository {
    async fn find(
        &self,
        voter: UserId,
        target: VoteTarget,
    ) -> Result<Option<VoteRecord>, VotePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(i16, DateTime<Utc>)> = match target {
            VoteTarget::Question { question_id } => question_votes::table
                .filter(question_votes::user_id.eq(voter.get()))
                .filter(question_votes::question_id.eq(question_id.get()))
                .select((question_votes::vote, question_votes::created_at))
                .first(&mut conn)
                .await
                .optional(),
            VoteTarget::QuestionTag {
                question_id,
                tag_id,
            } => question_tag_votes::table
                .filter(question_tag_votes::user_id.eq(voter.get()))
                .filter(question_tag_votes::question_id.eq(question_id.get()))
                .filter(question_tag_votes::tag_id.eq(tag_id.get()))
                .select((question_tag_votes::vote, question_tag_votes::created_at))
                .first(&mut conn)
                .await
                .optional(),
        }
        .map_err(map_diesel_error)?;

        row.map(|row| row_to_record(voter, target, row)).transpose()
    }

    async fn insert(&self, record: &VoteRecord) -> Result<(), VotePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = record.voter_id.get();
        let vote = record.direction.value();

        match record.target {
            VoteTarget::Question { question_id } => {
                diesel::insert_into(question_votes::table)
                    .values(&NewQuestionVoteRow {
                        user_id,
                        question_id: question_id.get(),
                        vote,
                        created_at: record.created_at,
                    })
                    .execute(&mut conn)
                    .await
            }
            VoteTarget::QuestionTag {
                question_id,
                tag_id,
            } => {
                diesel::insert_into(question_tag_votes::table)
                    .values(&NewQuestionTagVoteRow {
                        user_id,
                        question_id: question_id.get(),
                        tag_id: tag_id.get(),
                        vote,
                        created_at: record.created_at,
                    })
                    .execute(&mut conn)
                    .await
            }
        }
        .map(|_| ())
        .map_err(map_diesel_error)
    }

    async fn remove(&self, voter: UserId, target: VoteTarget) -> Result<bool, VotePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = match target {
            VoteTarget::Question { question_id } => {
                diesel::delete(
                    question_votes::table
                        .filter(question_votes::user_id.eq(voter.get()))
                        .filter(question_votes::question_id.eq(question_id.get())),
                )
                .execute(&mut conn)
                .await
            }
            VoteTarget::QuestionTag {
                question_id,
                tag_id,
            } => {
                diesel::delete(
                    question_tag_votes::table
                        .filter(question_tag_votes::user_id.eq(voter.get()))
                        .filter(question_tag_votes::question_id.eq(question_id.get()))
                        .filter(question_tag_votes::tag_id.eq(tag_id.get())),
                )
                .execute(&mut conn)
                .await
            }
        }
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn score(&self, target: VoteTarget) -> Result<i64, VotePersistenceError> {
        use diesel::dsl::sum;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: Option<i64> = match target {
            VoteTarget::Question { question_id } => question_votes::table
                .filter(question_votes::question_id.eq(question_id.get()))
                .select(sum(question_votes::vote))
                .first(&mut conn)
                .await,
            VoteTarget::QuestionTag {
                question_id,
                tag_id,
            } => question_tag_votes::table
                .filter(question_tag_votes::question_id.eq(question_id.get()))
                .filter(question_tag_votes::tag_id.eq(tag_id.get()))
                .select(sum(question_tag_votes::vote))
                .first(&mut conn)
                .await,
        }
        .map_err(map_diesel_error)?;

        Ok(total.unwrap_or(0))
    }
}
