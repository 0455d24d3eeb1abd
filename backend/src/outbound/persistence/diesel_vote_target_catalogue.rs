//! PostgreSQL-backed `VoteTargetCatalogue` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{VoteTargetCatalogue, VoteTargetCatalogueError};
use crate::domain::{QuestionId, TagId};

use super::diesel_basic_error_mapping::{
    ErrorConstructors, map_basic_diesel_error, map_basic_pool_error,
};
use super::pool::{DbPool, PoolError};
use super::schema::{questions, tags};

/// Existence checks against the `questions` and `tags` tables.
#[derive(Clone)]
pub struct DieselVoteTargetCatalogue {
    pool: DbPool,
}

impl DieselVoteTargetCatalogue {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> VoteTargetCatalogueError {
    map_basic_pool_error(error, VoteTargetCatalogueError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> VoteTargetCatalogueError {
    map_basic_diesel_error(
        error,
        ErrorConstructors {
            query: VoteTargetCatalogueError::query,
            connection: VoteTargetCatalogueError::connection,
            // Reads never violate constraints.
            unique: VoteTargetCatalogueError::query,
        },
    )
}

#[async_trait]
impl VoteTargetCatalogue for DieselVoteTargetCatalogue {
    async fn question_exists(&self, id: QuestionId) -> Result<bool, VoteTargetCatalogueError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(questions::table.filter(questions::id.eq(id.get()))))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn tag_exists(&self, id: TagId) -> Result<bool, VoteTargetCatalogueError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(tags::table.filter(tags::id.eq(id.get()))))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
