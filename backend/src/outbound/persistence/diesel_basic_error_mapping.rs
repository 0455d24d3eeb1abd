//! Shared Diesel error mapping for the repositories in this module.
//!
//! Each repository supplies constructors for its own port error; this module
//! decides which one a given Diesel failure becomes.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Port error constructors for the three failure classes a repository reports.
pub(crate) struct ErrorConstructors<Q, C, U> {
    pub query: Q,
    pub connection: C,
    /// Used for unique-constraint violations.
    pub unique: U,
}

/// Map pool errors into a repository-specific connection error.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.into_message())
}

/// Map a Diesel error using `constructors`.
pub(crate) fn map_basic_diesel_error<E, Q, C, U>(
    error: DieselError,
    constructors: ErrorConstructors<Q, C, U>,
) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
    U: FnOnce(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    let ErrorConstructors {
        query,
        connection,
        unique,
    } = constructors;
    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            unique("unique constraint violated")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        _ => query("database error"),
    }
}
