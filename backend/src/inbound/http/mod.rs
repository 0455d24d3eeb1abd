//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod identity;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod token_cookie;
pub mod users;
pub mod votes;

use actix_web::web;

pub use error::ApiResult;

/// Register every versioned API handler on `cfg`.
///
/// Callers mount this under `/api/v1`; health probes are registered
/// separately at the root.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(votes::vote_question)
        .service(votes::vote_question_tag)
        .service(votes::question_votes)
        .service(votes::question_tag_votes);
}
