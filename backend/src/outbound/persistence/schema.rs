//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match `backend/migrations` exactly.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Int8,
        /// Unique, case-sensitive login name.
        username -> Varchar,
        /// Unique email address; also accepted as a login identifier.
        email -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    questions (id) {
        id -> Int8,
        title -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    tags (id) {
        id -> Int8,
        name -> Varchar,
    }
}

diesel::table! {
    /// Tags applied to questions.
    question_tag_links (question_id, tag_id) {
        question_id -> Int8,
        tag_id -> Int8,
    }
}

diesel::table! {
    /// Votes on questions. Unique on `(user_id, question_id)`.
    question_votes (id) {
        id -> Int8,
        user_id -> Int8,
        question_id -> Int8,
        /// `+1` or `-1`.
        vote -> Int2,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Votes on a tag as applied to a question. Unique on
    /// `(user_id, question_id, tag_id)`.
    question_tag_votes (id) {
        id -> Int8,
        user_id -> Int8,
        question_id -> Int8,
        tag_id -> Int8,
        /// `+1` or `-1`.
        vote -> Int2,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(question_tag_links -> questions (question_id));
diesel::joinable!(question_tag_links -> tags (tag_id));
diesel::joinable!(question_votes -> questions (question_id));
diesel::joinable!(question_votes -> users (user_id));
diesel::joinable!(question_tag_votes -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    questions,
    tags,
    question_tag_links,
    question_votes,
    question_tag_votes,
);
