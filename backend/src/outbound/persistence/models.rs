//! Internal Diesel row structs.
//!
//! These stay inside the persistence layer; repositories convert them to
//! domain types before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{question_tag_votes, question_votes, users};

/// Row read from `users` for login and identity lookups.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewAccountRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = question_votes)]
pub(crate) struct NewQuestionVoteRow {
    pub user_id: i64,
    pub question_id: i64,
    pub vote: i16,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = question_tag_votes)]
pub(crate) struct NewQuestionTagVoteRow {
    pub user_id: i64,
    pub question_id: i64,
    pub tag_id: i64,
    pub vote: i16,
    pub created_at: DateTime<Utc>,
}
