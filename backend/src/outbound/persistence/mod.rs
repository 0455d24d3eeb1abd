//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module. Connections come from a `bb8` pool through
//! `diesel-async`, and every database failure is mapped to the owning port's
//! error type.
//!
//! # Example
//!
//! ```no_run
//! use qa_backend::outbound::persistence::{DbPool, DieselVoteRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), qa_backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/qa")).await?;
//! let votes = DieselVoteRepository::new(pool);
//! # let _ = votes;
//! # Ok(())
//! # }
//! ```

mod diesel_account_repository;
mod diesel_basic_error_mapping;
mod diesel_vote_repository;
mod diesel_vote_target_catalogue;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_vote_repository::DieselVoteRepository;
pub use diesel_vote_target_catalogue::DieselVoteTargetCatalogue;
pub use pool::{DbPool, PoolConfig, PoolError};
