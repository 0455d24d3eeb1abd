//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AccountPersistenceError, AccountRepository};
use crate::domain::{
    AccountValidationError, CredentialRecord, EmailAddress, Identity, NewAccount, PasswordHash,
    UserId, Username,
};

use super::diesel_basic_error_mapping::{
    ErrorConstructors, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{AccountRow, NewAccountRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `AccountRepository` port.
///
/// Usernames and emails carry unique indexes; a registration that collides
/// with either is reported as [`AccountPersistenceError::Duplicate`].
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountPersistenceError {
    map_basic_pool_error(error, AccountPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AccountPersistenceError {
    map_basic_diesel_error(
        error,
        ErrorConstructors {
            query: AccountPersistenceError::query,
            connection: AccountPersistenceError::connection,
            unique: AccountPersistenceError::duplicate,
        },
    )
}

fn invalid_row(err: AccountValidationError) -> AccountPersistenceError {
    AccountPersistenceError::query(format!("stored account is invalid: {err}"))
}

fn row_to_identity(row: &AccountRow) -> Result<Identity, AccountPersistenceError> {
    let id = UserId::new(row.id).map_err(invalid_row)?;
    let username = Username::new(row.username.clone()).map_err(invalid_row)?;
    Ok(Identity::new(id, username))
}

fn row_to_credentials(row: AccountRow) -> Result<CredentialRecord, AccountPersistenceError> {
    let identity = row_to_identity(&row)?;
    let email = EmailAddress::new(row.email).map_err(invalid_row)?;
    Ok(CredentialRecord::new(
        identity,
        email,
        PasswordHash::new(row.password_hash),
    ))
}

/// Pick the row whose username matches before one whose email matches.
fn prefer_username_match(rows: Vec<AccountRow>, identifier: &str) -> Option<AccountRow> {
    let position = rows
        .iter()
        .position(|row| row.username == identifier)
        .or_else(|| rows.iter().position(|row| row.email == identifier))?;
    rows.into_iter().nth(position)
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn account_by_identifier(
        &self,
        username_or_email: &str,
    ) -> Result<Option<CredentialRecord>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // One account may own the username while another owns it as an email.
        let rows: Vec<AccountRow> = users::table
            .filter(
                users::username
                    .eq(username_or_email)
                    .or(users::email.eq(username_or_email)),
            )
            .select(AccountRow::as_select())
            .limit(2)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        prefer_username_match(rows, username_or_email)
            .map(row_to_credentials)
            .transpose()
    }

    async fn account_by_id(&self, id: UserId) -> Result<Option<Identity>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AccountRow> = users::table
            .filter(users::id.eq(id.get()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref().map(row_to_identity).transpose()
    }

    async fn insert_account(&self, account: &NewAccount) -> Result<Identity, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: AccountRow = diesel::insert_into(users::table)
            .values(&NewAccountRow {
                username: account.username.as_ref(),
                email: account.email.as_ref(),
                password_hash: account.password_hash.as_str(),
            })
            .returning(AccountRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_identity(&row)
    }
}
