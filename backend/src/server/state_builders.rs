//! Builders wiring repositories and domain services into HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use qa_backend::domain::ports::{AccountRepository, VoteRepository, VoteTargetCatalogue};
use qa_backend::domain::{Argon2Passwords, IdentityService, TokenCodec, VoteLedgerService};
use qa_backend::inbound::http::state::{HttpState, HttpStatePorts};
use qa_backend::inbound::http::token_cookie::TokenCookieSettings;
use qa_backend::outbound::persistence::{
    DieselAccountRepository, DieselVoteRepository, DieselVoteTargetCatalogue,
};

use super::ServerConfig;

/// Storage adapters behind the domain services.
pub(super) struct Repositories<A, V, C> {
    pub accounts: Arc<A>,
    pub votes: Arc<V>,
    pub catalogue: Arc<C>,
}

/// Wire domain services over `repositories`.
pub(super) fn build_state_from<A, V, C>(
    repositories: Repositories<A, V, C>,
    passwords: Argon2Passwords,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
    token_cookie: TokenCookieSettings,
) -> web::Data<HttpState>
where
    A: AccountRepository + 'static,
    V: VoteRepository + 'static,
    C: VoteTargetCatalogue + 'static,
{
    let Repositories {
        accounts,
        votes,
        catalogue,
    } = repositories;
    let identity = Arc::new(IdentityService::new(
        accounts,
        passwords,
        codec,
        clock.clone(),
    ));
    let ledger = Arc::new(VoteLedgerService::new(votes, catalogue, clock));

    web::Data::new(HttpState::new(
        HttpStatePorts {
            identity: identity.clone(),
            registration: identity,
            votes: ledger,
        },
        token_cookie,
    ))
}

/// Build the shared HTTP state over PostgreSQL.
///
/// # Errors
/// Returns [`std::io::Error`] when the password hasher cannot be configured.
pub(super) fn build_http_state(config: ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let ServerConfig {
        db_pool,
        token_secret,
        token_cookie,
        ..
    } = config;
    let passwords = Argon2Passwords::new()
        .map_err(|err| std::io::Error::other(format!("password hasher setup failed: {err}")))?;

    Ok(build_state_from(
        Repositories {
            accounts: Arc::new(DieselAccountRepository::new(db_pool.clone())),
            votes: Arc::new(DieselVoteRepository::new(db_pool.clone())),
            catalogue: Arc::new(DieselVoteTargetCatalogue::new(db_pool)),
        },
        passwords,
        TokenCodec::new(token_secret),
        Arc::new(DefaultClock),
        token_cookie,
    ))
}
