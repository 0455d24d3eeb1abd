//! Port answering whether the things being voted on exist.
//!
//! Questions and tags are owned elsewhere; the ledger only needs existence
//! checks before it writes.

use async_trait::async_trait;

use crate::domain::{QuestionId, TagId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by vote target catalogue adapters.
    pub enum VoteTargetCatalogueError {
        /// Catalogue connection could not be established.
        Connection { message: String } => "vote target catalogue connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } => "vote target catalogue query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteTargetCatalogue: Send + Sync {
    async fn question_exists(&self, id: QuestionId) -> Result<bool, VoteTargetCatalogueError>;

    async fn tag_exists(&self, id: TagId) -> Result<bool, VoteTargetCatalogueError>;
}
