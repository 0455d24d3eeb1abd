//! Test helpers for inbound HTTP components.
//!
//! Wires the real domain services over in-memory stores so handler tests
//! exercise the full toggle and token paths without a database.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use argon2::Params;
use chrono::{TimeZone, Utc};

use crate::Trace;
use crate::domain::{
    Argon2Passwords, IdentityService, TokenCodec, TokenSecret, VoteLedgerService,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::token_cookie::TokenCookieSettings;
use crate::test_support::{
    InMemoryAccountRepository, InMemoryVoteRepository, InMemoryVoteTargetCatalogue, MutableClock,
};

/// Question ids known to the in-memory catalogue.
pub const KNOWN_QUESTIONS: [i64; 2] = [42, 43];
/// Tag id known to the in-memory catalogue.
pub const KNOWN_TAG: i64 = 5;

/// In-memory collaborators shared with the handlers under test.
pub struct TestBackend {
    pub accounts: Arc<InMemoryAccountRepository>,
    pub votes: Arc<InMemoryVoteRepository>,
    pub clock: Arc<MutableClock>,
    pub state: HttpState,
}

/// Build a backend with cheap password hashing and non-secure cookies.
pub fn test_backend() -> TestBackend {
    let accounts = Arc::new(InMemoryAccountRepository::default());
    let votes = Arc::new(InMemoryVoteRepository::default());
    let catalogue = KNOWN_QUESTIONS
        .iter()
        .fold(InMemoryVoteTargetCatalogue::default(), |catalogue, id| {
            catalogue.with_question(*id)
        })
        .with_tag(KNOWN_TAG);
    let start = Utc
        .with_ymd_and_hms(2024, 1, 15, 10, 0, 0)
        .single()
        .expect("valid timestamp");
    let clock = Arc::new(MutableClock::new(start));

    let passwords = Argon2Passwords::with_params(
        Params::new(8, 1, 1, None).expect("valid argon2 params"),
    )
    .expect("hasher");
    let codec = TokenCodec::new(TokenSecret::new(vec![b't'; 32]).expect("secret"));
    let identity = Arc::new(IdentityService::new(
        accounts.clone(),
        passwords,
        codec,
        clock.clone(),
    ));
    let ledger = Arc::new(VoteLedgerService::new(
        votes.clone(),
        Arc::new(catalogue),
        clock.clone(),
    ));

    let state = HttpState::new(
        HttpStatePorts {
            identity: identity.clone(),
            registration: identity,
            votes: ledger,
        },
        TokenCookieSettings {
            secure: false,
            ..TokenCookieSettings::default()
        },
    );

    TestBackend {
        accounts,
        votes,
        clock,
        state,
    }
}

/// Build an application serving the API under `/api/v1` with `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api))
}
