//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountRegistration, IdentityResolver, VoteLedger};
use crate::inbound::http::token_cookie::TokenCookieSettings;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub identity: Arc<dyn IdentityResolver>,
    pub registration: Arc<dyn AccountRegistration>,
    pub votes: Arc<dyn VoteLedger>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityResolver>,
    pub registration: Arc<dyn AccountRegistration>,
    pub votes: Arc<dyn VoteLedger>,
    pub token_cookie: TokenCookieSettings,
}

impl HttpState {
    /// Construct state from a ports bundle and cookie settings.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use argon2::Params;
    /// use mockable::DefaultClock;
    /// use qa_backend::domain::{
    ///     Argon2Passwords, IdentityService, TokenCodec, TokenSecret, VoteLedgerService,
    /// };
    /// use qa_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use qa_backend::inbound::http::token_cookie::TokenCookieSettings;
    /// use qa_backend::test_support::{
    ///     InMemoryAccountRepository, InMemoryVoteRepository, InMemoryVoteTargetCatalogue,
    /// };
    ///
    /// let passwords =
    ///     Argon2Passwords::with_params(Params::new(8, 1, 1, None).expect("params")).expect("hasher");
    /// let codec = TokenCodec::new(TokenSecret::generate());
    /// let identity = Arc::new(IdentityService::new(
    ///     Arc::new(InMemoryAccountRepository::default()),
    ///     passwords,
    ///     codec,
    ///     Arc::new(DefaultClock),
    /// ));
    /// let votes = Arc::new(VoteLedgerService::new(
    ///     Arc::new(InMemoryVoteRepository::default()),
    ///     Arc::new(InMemoryVoteTargetCatalogue::default()),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(
    ///     HttpStatePorts {
    ///         identity: identity.clone(),
    ///         registration: identity,
    ///         votes,
    ///     },
    ///     TokenCookieSettings::default(),
    /// );
    /// assert!(state.token_cookie.secure);
    /// ```
    pub fn new(ports: HttpStatePorts, token_cookie: TokenCookieSettings) -> Self {
        let HttpStatePorts {
            identity,
            registration,
            votes,
        } = ports;
        Self {
            identity,
            registration,
            votes,
            token_cookie,
        }
    }
}
